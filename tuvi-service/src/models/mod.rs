//! Domain models for the tử vi service.

pub mod calendar;
pub mod reading;

pub use calendar::{FallbackReason, LunarConversion, LunarDate, SolarDate};
pub use reading::{Hexagram, ReadingPeriod, UnknownPeriod, UserInfo};
