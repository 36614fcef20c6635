//! Bybit v5 REST client (public market data only).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::types::*;
use crate::exchange::http::{build_http_client, get_json, DEFAULT_REQUEST_TIMEOUT};
use crate::exchange::{Contract, ExchangeError, FailurePolicy, FeePolicy, FundingRateSource, Venue};
use crate::utils::quantize_rate;

/// Production REST endpoint.
pub const MAINNET_API_URL: &str = "https://api.bybit.com";
const INSTRUMENTS_INFO_ENDPOINT: &str = "/v5/market/instruments-info";
const FUNDING_HISTORY_ENDPOINT: &str = "/v5/market/funding/history";

const CATEGORY: &str = "linear";
const PAGE_LIMIT: &str = "1000";
/// Upper bound on listing pages; the linear category fits in one or two.
const MAX_PAGES: usize = 20;

/// Parse a trailing `-DDMMMYY` expiry suffix (e.g. `BTC-27DEC24`).
///
/// Returns `None` when the symbol has no such suffix or it names an
/// impossible date.
pub fn parse_expiry_suffix(symbol: &str) -> Option<NaiveDate> {
    let (_, suffix) = symbol.rsplit_once('-')?;
    if suffix.len() != 7 || !suffix.is_ascii() {
        return None;
    }

    let (day, month, year) = (&suffix[..2], &suffix[2..5], &suffix[5..]);
    // %b also matches lower-case month names
    if !day.bytes().all(|b| b.is_ascii_digit())
        || !year.bytes().all(|b| b.is_ascii_digit())
        || !month.bytes().all(|b| b.is_ascii_uppercase())
    {
        return None;
    }

    NaiveDate::parse_from_str(&format!("20{year}-{month}-{day}"), "%Y-%b-%d").ok()
}

/// Whether the symbol encodes an expiry strictly after `today`.
pub fn is_future_dated(symbol: &str, today: NaiveDate) -> bool {
    parse_expiry_suffix(symbol).is_some_and(|expiry| expiry > today)
}

/// Bybit API client for linear contract funding data.
#[derive(Debug, Clone)]
pub struct BybitClient {
    http: Client,
    base_url: String,
}

impl BybitClient {
    /// Create a new Bybit client for mainnet.
    pub fn new() -> Result<Self> {
        Self::with_base_url(MAINNET_API_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new Bybit client with a custom base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Unwrap a v5 envelope, turning a non-zero `retCode` into an API error.
    fn into_result<T>(response: BybitResponse<T>) -> Result<T, ExchangeError> {
        if response.ret_code != 0 {
            return Err(ExchangeError::api(response.ret_code, response.ret_msg));
        }
        response
            .result
            .ok_or_else(|| ExchangeError::api(response.ret_code, "missing result"))
    }

    /// Fetch every linear instrument, following the pagination cursor.
    #[instrument(skip(self), name = "bybit_instruments")]
    pub async fn get_instruments(&self) -> Result<Vec<Instrument>, ExchangeError> {
        let url = format!("{}{}", self.base_url, INSTRUMENTS_INFO_ENDPOINT);
        let mut instruments = Vec::new();
        let mut cursor = String::new();

        for page in 0..MAX_PAGES {
            let mut query = vec![("category", CATEGORY), ("limit", PAGE_LIMIT)];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }

            let response: BybitResponse<InstrumentsPage> =
                get_json(&self.http, &url, &query).await?;
            let result = Self::into_result(response)?;
            let list = result.list.ok_or_else(|| ExchangeError::missing_field("list"))?;
            debug!(page, count = list.len(), "Fetched Bybit instruments page");
            instruments.extend(list);

            if result.next_page_cursor.is_empty() || result.next_page_cursor == cursor {
                return Ok(instruments);
            }
            cursor = result.next_page_cursor;
        }

        warn!(pages = MAX_PAGES, "Bybit instrument pagination did not terminate");
        Ok(instruments)
    }

    /// Get the most recent settled funding record for a symbol.
    #[instrument(skip(self), name = "bybit_funding_history")]
    pub async fn get_latest_funding(&self, symbol: &str) -> Result<FundingRecord, ExchangeError> {
        let url = format!("{}{}", self.base_url, FUNDING_HISTORY_ENDPOINT);
        let query = [("category", CATEGORY), ("symbol", symbol), ("limit", "1")];

        let response: BybitResponse<FundingHistory> = get_json(&self.http, &url, &query).await?;
        Self::into_result(response)?
            .list
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::EmptyResult {
                symbol: symbol.to_string(),
            })
    }

    /// Convert instruments to contracts, dropping symbols dated after `today`.
    fn contracts_from(instruments: Vec<Instrument>, today: NaiveDate) -> Vec<Contract> {
        instruments
            .into_iter()
            .filter(|i| !is_future_dated(&i.symbol, today))
            .map(|i| {
                Contract::new(
                    i.symbol,
                    i.taker_fee.unwrap_or(Decimal::ZERO),
                    i.maker_fee.unwrap_or(Decimal::ZERO),
                )
            })
            .collect()
    }
}

#[async_trait]
impl FundingRateSource for BybitClient {
    fn venue(&self) -> Venue {
        Venue::Bybit
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::RoundTripMaker
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::SubstituteZero
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError> {
        let instruments = self.get_instruments().await?;
        let total = instruments.len();
        let contracts = Self::contracts_from(instruments, Utc::now().date_naive());
        debug!(total, kept = contracts.len(), "Fetched Bybit contracts");
        Ok(contracts)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let record = self.get_latest_funding(symbol).await?;
        let rate = record.funding_rate.ok_or_else(|| ExchangeError::EmptyResult {
            symbol: symbol.to_string(),
        })?;
        Ok(quantize_rate(rate))
    }
}
