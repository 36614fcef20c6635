//! Exchange integrations for funding rate screening.
//!
//! Each venue exposes two public REST calls: a contract listing with fee
//! schedule and a per-symbol funding rate. Both are normalized into
//! [`Contract`] records and quantized [`Decimal`](rust_decimal::Decimal)
//! rates behind the [`FundingRateSource`] trait.
//!
//! | Venue   | Fee policy       | Failure policy  |
//! |---------|------------------|-----------------|
//! | Mexc    | round-trip maker | exclude         |
//! | Bybit   | round-trip maker | substitute zero |
//! | Okx     | taker + maker    | exclude         |
//! | Binance | taker + maker    | exclude         |

pub mod binance;
pub mod bybit;
mod error;
mod http;
pub mod mexc;
pub mod okx;
mod traits;
mod types;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use error::ExchangeError;
pub use http::{build_http_client, DEFAULT_REQUEST_TIMEOUT};
pub use mexc::MexcClient;
pub use okx::OkxClient;
pub use traits::*;
pub use types::{Contract, FundingQuote};

/// Build the client for `venue` against `base_url`.
pub fn connect(
    venue: Venue,
    base_url: &str,
    timeout: Duration,
) -> Result<Arc<dyn FundingRateSource>> {
    let source: Arc<dyn FundingRateSource> = match venue {
        Venue::Mexc => Arc::new(MexcClient::with_base_url(base_url, timeout)?),
        Venue::Bybit => Arc::new(BybitClient::with_base_url(base_url, timeout)?),
        Venue::Okx => Arc::new(OkxClient::with_base_url(base_url, timeout)?),
        Venue::Binance => Arc::new(BinanceClient::with_base_url(base_url, timeout)?),
    };
    Ok(source)
}
