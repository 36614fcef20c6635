//! Venue-agnostic traits for funding data providers.
//!
//! Every supported exchange implements [`FundingRateSource`]. The screener
//! only talks to this trait, so adding a venue means writing a client and
//! choosing its fee and failure policies.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ExchangeError;
use super::types::Contract;

/// Venue identifier for multi-venue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Mexc,
    Bybit,
    Okx,
    Binance,
}

impl Venue {
    /// All venues in default report order.
    pub const ALL: [Venue; 4] = [Venue::Mexc, Venue::Bybit, Venue::Okx, Venue::Binance];
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Mexc => write!(f, "Mexc"),
            Venue::Bybit => write!(f, "Bybit"),
            Venue::Okx => write!(f, "Okx"),
            Venue::Binance => write!(f, "Binance"),
        }
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mexc" => Ok(Venue::Mexc),
            "bybit" => Ok(Venue::Bybit),
            "okx" => Ok(Venue::Okx),
            "binance" => Ok(Venue::Binance),
            other => Err(format!("unknown exchange: {other}")),
        }
    }
}

/// How a venue charges for entering and leaving a carry position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// One taker fill plus one maker fill.
    TakerPlusMaker,
    /// Maker fills on both legs.
    RoundTripMaker,
}

impl FeePolicy {
    /// Total fee cost for the contract, or `None` on decimal overflow.
    pub fn fee_cost(&self, contract: &Contract) -> Option<Decimal> {
        match self {
            FeePolicy::TakerPlusMaker => contract
                .taker_fee_rate
                .checked_add(contract.maker_fee_rate),
            FeePolicy::RoundTripMaker => contract.maker_fee_rate.checked_mul(Decimal::TWO),
        }
    }

    /// Funding rate net of fees, or `None` on decimal overflow.
    pub fn potential_profit(&self, funding_rate: Decimal, contract: &Contract) -> Option<Decimal> {
        funding_rate.checked_sub(self.fee_cost(contract)?)
    }
}

/// What the screener does with a symbol whose funding rate fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Drop the symbol from the ranking.
    Exclude,
    /// Rank the symbol with a funding rate of zero.
    SubstituteZero,
}

/// Trait for venues that provide perpetual contract listings and funding rates.
///
/// `list_contracts` is called once when a screener is built; its failure is
/// fatal for that venue. `fetch_funding_rate` is called once per contract per
/// run and returns a rate already quantized to six fractional digits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FundingRateSource: Send + Sync {
    /// Returns the venue identifier.
    fn venue(&self) -> Venue;

    /// Fee formula used when ranking this venue's contracts.
    fn fee_policy(&self) -> FeePolicy;

    /// Handling of per-symbol fetch failures.
    fn failure_policy(&self) -> FailurePolicy;

    /// Fetch all tradable perpetual contracts with their fee schedule.
    async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError>;

    /// Fetch the current funding rate for one contract.
    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError>;
}
