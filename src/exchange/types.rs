//! Normalized records shared by all venues, plus serde helpers for the
//! loosely-typed numeric fields exchanges return.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A perpetual contract and its fee schedule, as listed by a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contract {
    /// Symbol in the venue's native format (e.g. "BTC_USDT", "BTC-USDT-SWAP")
    pub symbol: String,
    pub taker_fee_rate: Decimal,
    pub maker_fee_rate: Decimal,
}

impl Contract {
    pub fn new(symbol: impl Into<String>, taker_fee_rate: Decimal, maker_fee_rate: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            taker_fee_rate,
            maker_fee_rate,
        }
    }
}

/// A funding rate observed for one contract during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingQuote {
    pub symbol: String,
    /// Quantized to six fractional digits
    pub funding_rate: Decimal,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNumber {
    Str(String),
    Number(serde_json::Number),
}

impl StrOrNumber {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Option<Decimal>, E> {
        let raw = match self {
            StrOrNumber::Str(s) if s.trim().is_empty() => return Ok(None),
            StrOrNumber::Str(s) => s,
            StrOrNumber::Number(n) => n.to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(Some)
            .map_err(|e| E::custom(format!("invalid decimal {raw:?}: {e}")))
    }
}

/// Deserialize a decimal that may arrive as a JSON string or number.
pub(crate) fn deserialize_decimal_lenient<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    StrOrNumber::deserialize(deserializer)?
        .into_decimal::<D::Error>()?
        .ok_or_else(|| serde::de::Error::custom("empty decimal string"))
}

/// Like [`deserialize_decimal_lenient`], mapping `null` and `""` to `None`.
/// Pair with `#[serde(default)]` so absent fields also become `None`.
pub(crate) fn deserialize_decimal_lenient_option<'de, D>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StrOrNumber>::deserialize(deserializer)? {
        Some(value) => value.into_decimal(),
        None => Ok(None),
    }
}
