pub mod calendar;
pub mod hexagram;
pub mod metrics;
pub mod prompts;
pub mod providers;
pub mod staging;

pub use calendar::solar_to_lunar;
pub use hexagram::select_random;
pub use staging::{StagedUpload, UploadStaging};
