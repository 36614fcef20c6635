//! Shared utilities.

pub mod decimal;

pub use decimal::{format_percentage, quantize_rate, FUNDING_RATE_SCALE};
