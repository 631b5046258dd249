//! Tử vi chart analysis and trigram reading backend.
//!
//! Birth data and a chart image come in over HTTP, the birth date is
//! converted to the Vietnamese lunar calendar, and a Vietnamese prompt is
//! forwarded to Gemini whose reply is returned as-is.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::AppState;
