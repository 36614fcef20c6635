//! Type definitions for Bybit v5 API responses.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::exchange::types::deserialize_decimal_lenient_option;

/// Common v5 response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    pub result: Option<T>,
}

/// One page of `instruments-info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentsPage {
    /// Required on success; optional so error envelopes with `result: {}` decode.
    #[serde(default)]
    pub list: Option<Vec<Instrument>>,
    #[serde(default)]
    pub next_page_cursor: String,
}

/// Instrument entry in the linear category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub taker_fee: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub maker_fee: Option<Decimal>,
}

/// Result of `funding/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct FundingHistory {
    #[serde(default)]
    pub list: Vec<FundingRecord>,
}

/// A settled funding record, newest first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRecord {
    #[serde(default, deserialize_with = "deserialize_decimal_lenient_option")]
    pub funding_rate: Option<Decimal>,
}
