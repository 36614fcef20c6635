//! Binance futures REST client (public market data only).

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::*;
use crate::exchange::http::{build_http_client, get_json, DEFAULT_REQUEST_TIMEOUT};
use crate::exchange::{Contract, ExchangeError, FailurePolicy, FeePolicy, FundingRateSource, Venue};
use crate::utils::quantize_rate;

/// Production futures REST endpoint.
pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
const EXCHANGE_INFO_ENDPOINT: &str = "/fapi/v1/exchangeInfo";
const PREMIUM_INDEX_ENDPOINT: &str = "/fapi/v1/premiumIndex";

const PERPETUAL: &str = "PERPETUAL";

/// Binance API client for futures funding data.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client for mainnet.
    pub fn new() -> Result<Self> {
        Self::with_base_url(FUTURES_BASE_URL, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a new Binance client with a custom base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get futures exchange information.
    #[instrument(skip(self), name = "binance_exchange_info")]
    pub async fn get_futures_exchange_info(&self) -> Result<FuturesExchangeInfo, ExchangeError> {
        let url = format!("{}{}", self.base_url, EXCHANGE_INFO_ENDPOINT);
        get_json(&self.http, &url, &[]).await
    }

    /// Get the premium index (mark price and funding) for one symbol.
    #[instrument(skip(self), name = "binance_premium_index")]
    pub async fn get_premium_index(&self, symbol: &str) -> Result<PremiumIndex, ExchangeError> {
        let url = format!("{}{}", self.base_url, PREMIUM_INDEX_ENDPOINT);
        get_json(&self.http, &url, &[("symbol", symbol)]).await
    }
}

#[async_trait]
impl FundingRateSource for BinanceClient {
    fn venue(&self) -> Venue {
        Venue::Binance
    }

    fn fee_policy(&self) -> FeePolicy {
        FeePolicy::TakerPlusMaker
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Exclude
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError> {
        let info = self.get_futures_exchange_info().await?;
        let total = info.symbols.len();

        let contracts: Vec<Contract> = info
            .symbols
            .into_iter()
            .filter(|s| s.contract_type == PERPETUAL)
            .map(|s| {
                Contract::new(
                    s.symbol,
                    s.taker_fee.unwrap_or(Decimal::ZERO),
                    s.maker_fee.unwrap_or(Decimal::ZERO),
                )
            })
            .collect();

        debug!(total, perpetual = contracts.len(), "Fetched Binance contracts");
        Ok(contracts)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let index = self.get_premium_index(symbol).await?;
        Ok(quantize_rate(index.last_funding_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BinanceClient {
        BinanceClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_contracts_keeps_perpetuals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EXCHANGE_INFO_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbols": [
                    {"symbol": "BTCUSDT", "contractType": "PERPETUAL", "status": "TRADING",
                     "takerFee": "0.0004", "makerFee": "0.0002"},
                    {"symbol": "BTCUSDT_251226", "contractType": "CURRENT_QUARTER", "status": "TRADING"},
                    {"symbol": "ETHUSDT", "contractType": "PERPETUAL", "status": "TRADING"}
                ]
            })))
            .mount(&server)
            .await;

        let contracts = client_for(&server).list_contracts().await.unwrap();

        assert_eq!(contracts.len(), 2);
        assert_eq!(
            contracts[0],
            Contract::new("BTCUSDT", dec!(0.0004), dec!(0.0002))
        );
        // Missing fee fields default to zero
        assert_eq!(contracts[1], Contract::new("ETHUSDT", dec!(0), dec!(0)));
    }

    #[tokio::test]
    async fn test_list_contracts_propagates_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EXCHANGE_INFO_ENDPOINT))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_contracts().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Status { .. }));
    }

    #[tokio::test]
    async fn test_fetch_funding_rate_quantizes_last_funding_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PREMIUM_INDEX_ENDPOINT))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "BTCUSDT",
                "markPrice": "64000.10000000",
                "lastFundingRate": "0.00012345",
                "nextFundingTime": 1700000000000i64
            })))
            .mount(&server)
            .await;

        let rate = client_for(&server).fetch_funding_rate("BTCUSDT").await.unwrap();
        assert_eq!(rate, dec!(0.000123));
        assert_eq!(rate.scale(), 6);
    }

    #[tokio::test]
    async fn test_fetch_funding_rate_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PREMIUM_INDEX_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "BTCUSDT"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_funding_rate("BTCUSDT").await.unwrap_err();
        assert!(matches!(err, ExchangeError::Decode(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_fetch() {
        let client = BinanceClient::new().unwrap();
        let contracts = client.list_contracts().await.unwrap();
        assert!(!contracts.is_empty());
        let rate = client.fetch_funding_rate(&contracts[0].symbol).await.unwrap();
        println!("{} funding rate: {}", contracts[0].symbol, rate);
    }
}
