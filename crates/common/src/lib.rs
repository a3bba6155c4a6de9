//! Shared building blocks for the placeshare crates: logging setup,
//! process metrics, runtime directory checks and a few response types.

pub mod types;
pub mod utils;
pub mod env;
pub mod metrics;
