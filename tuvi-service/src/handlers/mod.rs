//! HTTP handlers for the tử vi service.

pub mod health;
pub mod metrics;
pub mod oracle;
pub mod submit;

pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
pub use oracle::oracle;
pub use submit::submit;

use service_core::error::AppError;

/// HTTP status a handler result maps to, for request metrics.
fn status_of<T>(result: &Result<T, AppError>) -> u16 {
    match result {
        Ok(_) => 200,
        Err(e) => e.status_code().as_u16(),
    }
}
