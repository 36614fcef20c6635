//! MEXC contract REST client (public market data only).

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
pub const MAINNET_API_URL: &str = "https://contract.mexc.com";
const CONTRACT_DETAIL_ENDPOINT: &str = "/api/v1/contract/detail";
const FUNDING_RATE_ENDPOINT: &str = "/api/v1/contract/funding_rate";

/// MEXC API client for contract funding data.
#[derive(Debug, Clone)]
pub struct MexcClient {
    http: Client,
    base_url: String,
}

impl MexcClient {
    /// Create a new MEXC client for mainnet.
    pub fn new() -> Result<Self> {
        Self::with_base_url(MAINNET_API_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new MEXC client with a custom base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a URL and unwrap `data`, rejecting `success: false`.
    async fn get_data<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, ExchangeError> {
        let response: MexcResponse<T> = get_json(&self.http, url, &[]).await?;
        if !response.success {
            return Err(ExchangeError::api(
                response.code,
                response.message.unwrap_or_default(),
            ));
        }
        Ok(response.data)
    }

    /// Get details for every listed contract. A success envelope without
    /// `data` is a decode error, not an empty listing.
    #[instrument(skip(self), name = "mexc_contract_detail")]
    pub async fn get_contract_details(&self) -> Result<Vec<ContractDetail>, ExchangeError> {
        let url = format!("{}{}", self.base_url, CONTRACT_DETAIL_ENDPOINT);
        self.get_data(&url)
            .await?
            .ok_or_else(|| ExchangeError::missing_field("data"))
    }

    /// Get the current funding rate for one contract.
    #[instrument(skip(self), name = "mexc_funding_rate")]
    pub async fn get_funding_rate(&self, symbol: &str) -> Result<MexcFundingRate, ExchangeError> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            FUNDING_RATE_ENDPOINT,
            urlencoding::encode(symbol)
        );
        self.get_data(&url)
            .await?
            .ok_or_else(|| ExchangeError::EmptyResult {
                symbol: symbol.to_string(),
            })
    }
}

#[async_trait]
impl FundingRateSource for MexcClient {
    fn venue(&self) -> Venue {
        Venue::Mexc
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::RoundTripMaker
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Exclude
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError> {
        let contracts: Vec<Contract> = self
            .get_contract_details()
            .await?
            .into_iter()
            .map(|d| {
                Contract::new(
                    d.symbol,
                    d.taker_fee_rate.unwrap_or(Decimal::ZERO),
                    d.maker_fee_rate.unwrap_or(Decimal::ZERO),
                )
            })
            .collect();

        debug!(count = contracts.len(), "Fetched MEXC contracts");
        Ok(contracts)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let funding = self.get_funding_rate(symbol).await?;
        Ok(quantize_rate(funding.funding_rate))
    }
}
