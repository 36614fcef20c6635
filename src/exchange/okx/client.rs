//! OKX v5 REST client (public market data only).

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::*;
use crate::exchange::http::{build_http_client, get_json, DEFAULT_REQUEST_TIMEOUT};
use crate::exchange::{Contract, ExchangeError, FailurePolicy, FeePolicy, FundingRateSource, Venue};
use crate::utils::quantize_rate;

/// Production REST endpoint.
pub const MAINNET_API_URL: &str = "https://www.okx.com";
const INSTRUMENTS_ENDPOINT: &str = "/api/v5/public/instruments";
const FUNDING_RATE_ENDPOINT: &str = "/api/v5/public/funding-rate";

/// OKX API client for perpetual swap funding data.
#[derive(Debug, Clone)]
pub struct OkxClient {
    http: Client,
    base_url: String,
}

impl OkxClient {
    /// Create a new OKX client for mainnet.
    pub fn new() -> Result<Self> {
        Self::with_base_url(MAINNET_API_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new OKX client with a custom base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET an endpoint and unwrap the `data` array, rejecting non-zero codes
    /// and success envelopes without `data`.
    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ExchangeError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response: OkxResponse<T> = get_json(&self.http, &url, query).await?;
        if response.code != "0" {
            return Err(ExchangeError::api(response.code, response.msg));
        }
        response.data.ok_or_else(|| ExchangeError::missing_field("data"))
    }

    /// Get all perpetual swap instruments.
    #[instrument(skip(self), name = "okx_instruments")]
    pub async fn get_swap_instruments(&self) -> Result<Vec<SwapInstrument>, ExchangeError> {
        self.get_data(INSTRUMENTS_ENDPOINT, &[("instType", "SWAP")])
            .await
    }

    /// Get the current funding rate for one swap.
    #[instrument(skip(self), name = "okx_funding_rate")]
    pub async fn get_funding_rate(&self, inst_id: &str) -> Result<OkxFundingRate, ExchangeError> {
        self.get_data(FUNDING_RATE_ENDPOINT, &[("instId", inst_id)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::EmptyResult {
                symbol: inst_id.to_string(),
            })
    }
}

#[async_trait]
impl FundingRateSource for OkxClient {
    fn venue(&self) -> Venue {
        Venue::Okx
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::TakerPlusMaker
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Exclude
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError> {
        let contracts: Vec<Contract> = self
            .get_swap_instruments()
            .await?
            .into_iter()
            .map(|i| {
                Contract::new(
                    i.inst_id,
                    i.taker_fee_rate.unwrap_or(Decimal::ZERO),
                    i.maker_fee_rate.unwrap_or(Decimal::ZERO),
                )
            })
            .collect();

        debug!(count = contracts.len(), "Fetched OKX contracts");
        Ok(contracts)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let rate = self
            .get_funding_rate(symbol)
            .await?
            .funding_rate
            .ok_or_else(|| ExchangeError::EmptyResult {
                symbol: symbol.to_string(),
            })?;
        Ok(quantize_rate(rate))
    }
}
