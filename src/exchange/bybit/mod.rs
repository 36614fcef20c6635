//! Bybit v5 linear perpetuals integration.
//!
//! Bybit lists dated futures in the same `linear` category as perpetuals,
//! so contracts whose symbol ends in an expiry suffix (`BTC-27DEC24`) dated
//! after today are dropped at listing time. Ranked with the round-trip maker
//! fee convention; failed symbols are ranked with a zero funding rate.

mod client;
mod types;

pub use client::{is_future_dated, parse_expiry_suffix, BybitClient, MAINNET_API_URL};
pub use types::*;
