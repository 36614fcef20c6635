//! Binance USDⓈ-M futures integration.
//!
//! Contracts come from `exchangeInfo` filtered to `contractType == PERPETUAL`;
//! funding rates from `premiumIndex` (`lastFundingRate`). Ranked with the
//! taker+maker fee convention; failed symbols are dropped.

mod client;
mod types;

pub use client::{BinanceClient, FUTURES_BASE_URL};
pub use types::*;
