//! Type definitions for Binance futures API responses.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::exchange::types::{deserialize_decimal_lenient, deserialize_decimal_lenient_option};

/// Exchange information for futures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesExchangeInfo {
    pub symbols: Vec<FuturesSymbolInfo>,
}

/// Symbol information for futures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesSymbolInfo {
    pub symbol: String,
    /// "PERPETUAL", "CURRENT_QUARTER", "NEXT_QUARTER", ...
    #[serde(default)]
    pub contract_type: String,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub taker_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub maker_fee: Option<Decimal>,
}

/// Premium index entry for a single symbol.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    #[serde(deserialize_with = "deserialize_decimal_lenient")]
    pub last_funding_rate: Decimal,
}
