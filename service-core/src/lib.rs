//! service-core: Shared infrastructure for the tuvi backend services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
