//! Type definitions for OKX v5 API responses.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::exchange::types::deserialize_decimal_lenient_option;

/// Common v5 response envelope. `code` is `"0"` on success.
#[derive(Debug, Clone, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub data: Option<Vec<T>>,
}

/// Public instrument entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInstrument {
    pub inst_id: String,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub taker_fee_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub maker_fee_rate: Option<Decimal>,
}

/// Current funding rate for one swap.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxFundingRate {
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub funding_rate: Option<Decimal>,
}
