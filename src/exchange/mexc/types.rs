//! Type definitions for MEXC contract API responses.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::exchange::types::{deserialize_decimal_lenient, deserialize_decimal_lenient_option};

/// Common response envelope. Errors carry `success: false` and a `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct MexcResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Contract detail entry. Fee rates are JSON numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetail {
    pub symbol: String,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub taker_fee_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub maker_fee_rate: Option<Decimal>,
}

/// Current funding rate for one contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MexcFundingRate {
    #[serde(deserialize_with = "deserialize_decimal_lenient")]
    pub funding_rate: Decimal,
}
