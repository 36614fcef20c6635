//! # Funding Screener
//!
//! Polls derivatives exchanges for perpetual funding rates and fee
//! schedules, ranks contracts by funding net of trading fees, and reports
//! the top results per exchange.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `exchange`: Per-venue REST clients behind the `FundingRateSource` trait
//! - `screener`: Concurrent fetch, ranking, truncation and report rendering
//! - `utils`: Shared utilities and decimal arithmetic

pub mod config;
pub mod exchange;
pub mod screener;
pub mod utils;

pub use config::Config;
