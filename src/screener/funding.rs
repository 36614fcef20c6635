//! Per-venue funding screener.
//!
//! Holds the contract list fetched at construction, fans out one funding
//! rate request per contract with bounded concurrency, nets out fees and
//! returns the contracts ranked by potential profit.

use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::exchange::{
    Contract, ExchangeError, FailurePolicy, FeePolicy, FundingQuote, FundingRateSource, Venue,
    DEFAULT_REQUEST_TIMEOUT,
};
use crate::utils::quantize_rate;

/// Default number of in-flight funding rate requests per screener.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Failure while turning a fetched rate into a ranked result.
#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("Profit calculation overflowed for {symbol}")]
    Overflow { symbol: String },
}

/// Fan-out parameters for a screener run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenerSettings {
    /// Maximum concurrent funding rate requests
    pub concurrency: usize,
    /// Deadline for a single funding rate request
    pub request_timeout: Duration,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A contract ranked by funding rate net of fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedResult {
    pub ticker: String,
    pub funding_rate: Decimal,
    pub potential_profit: Decimal,
}

impl RankedResult {
    /// Combine a contract with its funding quote under the venue's fee policy.
    pub fn from_quote(
        contract: &Contract,
        quote: &FundingQuote,
        fee_policy: FeePolicy,
    ) -> Result<Self, ScreenerError> {
        let potential_profit = fee_policy
            .potential_profit(quote.funding_rate, contract)
            .ok_or_else(|| ScreenerError::Overflow {
                symbol: contract.symbol.clone(),
            })?;

        Ok(Self {
            ticker: contract.symbol.clone(),
            funding_rate: quote.funding_rate,
            potential_profit,
        })
    }
}

/// Sort descending by potential profit. The sort is stable, so ties keep
/// their incoming (fetch-completion) order.
pub fn sort_by_profit(results: &mut [RankedResult]) {
    results.sort_by(|a, b| b.potential_profit.cmp(&a.potential_profit));
}

/// Screens one venue's perpetual contracts for funding carry.
pub struct FundingScreener {
    source: Arc<dyn FundingRateSource>,
    contracts: Vec<Contract>,
    settings: ScreenerSettings,
    span: Span,
}

impl std::fmt::Debug for FundingScreener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundingScreener")
            .field("venue", &self.venue())
            .field("contracts", &self.contracts.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl FundingScreener {
    /// Fetch the venue's contract list and build a screener around it.
    ///
    /// A listing failure is returned as-is; there is no fallback.
    pub async fn new(
        source: Arc<dyn FundingRateSource>,
        settings: ScreenerSettings,
    ) -> Result<Self, ExchangeError> {
        let span = info_span!("screener", venue = %source.venue());
        let contracts = source.list_contracts().instrument(span.clone()).await?;
        Ok(Self::with_contracts(source, contracts, settings, span))
    }

    fn with_contracts(
        source: Arc<dyn FundingRateSource>,
        contracts: Vec<Contract>,
        settings: ScreenerSettings,
        span: Span,
    ) -> Self {
        span.in_scope(|| {
            info!(
                contracts = contracts.len(),
                concurrency = settings.concurrency,
                "Initialized {} screener",
                source.venue()
            )
        });

        Self {
            source,
            contracts,
            settings,
            span,
        }
    }

    pub fn venue(&self) -> Venue {
        self.source.venue()
    }

    /// Display name used in reports.
    pub fn name(&self) -> String {
        self.venue().to_string()
    }

    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    /// Fetch every contract's funding rate and return the ranking.
    ///
    /// Per-symbol failures never abort the run: they are handled by the
    /// venue's [`FailurePolicy`]. The result is unbounded; truncation is up
    /// to the caller.
    pub async fn run(&self) -> Vec<RankedResult> {
        self.rank().instrument(self.span.clone()).await
    }

    async fn rank(&self) -> Vec<RankedResult> {
        let fee_policy = self.source.fee_policy();
        let failure_policy = self.source.failure_policy();

        let outcomes = self.fetch_quotes().await;
        let mut ranked = Vec::with_capacity(outcomes.len());
        let mut failed = 0usize;

        for (contract, outcome) in outcomes {
            let quote = match outcome {
                Ok(quote) => quote,
                Err(e) => {
                    failed += 1;
                    match failure_policy {
                        FailurePolicy::Exclude => {
                            warn!(symbol = %contract.symbol, error = %e, "Funding rate unavailable, excluding");
                            continue;
                        }
                        FailurePolicy::SubstituteZero => {
                            warn!(symbol = %contract.symbol, error = %e, "Funding rate unavailable, using zero");
                            FundingQuote {
                                symbol: contract.symbol.clone(),
                                funding_rate: quantize_rate(Decimal::ZERO),
                            }
                        }
                    }
                }
            };

            match RankedResult::from_quote(contract, &quote, fee_policy) {
                Ok(result) => ranked.push(result),
                Err(e) => error!(symbol = %contract.symbol, error = %e, "Error analyzing contract"),
            }
        }

        sort_by_profit(&mut ranked);

        info!(
            contracts = self.contracts.len(),
            ranked = ranked.len(),
            failed,
            "{} screener completed",
            self.venue()
        );
        ranked
    }

    /// Fan out one funding rate request per contract, at most
    /// `settings.concurrency` in flight. Outcomes arrive in completion order.
    async fn fetch_quotes(&self) -> Vec<(&Contract, Result<FundingQuote, ExchangeError>)> {
        let source = &self.source;
        let timeout = self.settings.request_timeout;

        stream::iter(self.contracts.iter())
            .map(|contract| async move {
                let symbol = contract.symbol.as_str();
                let outcome = match tokio::time::timeout(timeout, source.fetch_funding_rate(symbol))
                    .await
                {
                    Ok(Ok(funding_rate)) => Ok(FundingQuote {
                        symbol: symbol.to_string(),
                        funding_rate,
                    }),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(ExchangeError::Timeout {
                        symbol: symbol.to_string(),
                    }),
                };
                (contract, outcome)
            })
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::MockFundingRateSource;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn mock_source(
        fee_policy: FeePolicy,
        failure_policy: FailurePolicy,
        contracts: Vec<Contract>,
        rates: HashMap<&'static str, Decimal>,
    ) -> Arc<dyn FundingRateSource> {
        let mut mock = MockFundingRateSource::new();
        mock.expect_venue().return_const(Venue::Okx);
        mock.expect_fee_policy().return_const(fee_policy);
        mock.expect_failure_policy().return_const(failure_policy);
        mock.expect_list_contracts()
            .times(1)
            .returning(move || Ok(contracts.clone()));
        mock.expect_fetch_funding_rate().returning(move |symbol: &str| {
            rates
                .get(symbol)
                .copied()
                .map(quantize_rate)
                .ok_or_else(|| ExchangeError::EmptyResult {
                    symbol: symbol.to_string(),
                })
        });
        Arc::new(mock)
    }

    fn contracts() -> Vec<Contract> {
        vec![
            Contract::new("AAA", dec!(0.0002), dec!(0.0002)),
            Contract::new("BBB", dec!(0.0005), dec!(0.0001)),
            Contract::new("CCC", dec!(0), dec!(0)),
            Contract::new("DDD", dec!(0.0002), dec!(0.0003)),
        ]
    }

    fn rates() -> HashMap<&'static str, Decimal> {
        HashMap::from([
            ("AAA", dec!(0.001)),
            ("BBB", dec!(0.0003)),
            ("CCC", dec!(-0.0001)),
            // DDD deliberately missing: its fetch fails
        ])
    }

    #[tokio::test]
    async fn test_run_ranks_descending_taker_plus_maker() {
        let source = mock_source(
            FeePolicy::TakerPlusMaker,
            FailurePolicy::Exclude,
            contracts(),
            rates(),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let results = screener.run().await;

        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "CCC", "BBB"]);
        assert_eq!(results[0].potential_profit, dec!(0.000600));
        assert_eq!(results[1].potential_profit, dec!(-0.0001));
        assert_eq!(results[2].potential_profit, dec!(-0.0003));
        assert!(results
            .windows(2)
            .all(|w| w[0].potential_profit >= w[1].potential_profit));
    }

    #[tokio::test]
    async fn test_run_round_trip_maker() {
        let source = mock_source(
            FeePolicy::RoundTripMaker,
            FailurePolicy::Exclude,
            vec![Contract::new("DDD", dec!(0.0002), dec!(0.0003))],
            HashMap::from([("DDD", dec!(0.001))]),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let results = screener.run().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].potential_profit, dec!(0.000400));
    }

    #[tokio::test]
    async fn test_exclude_policy_drops_failed_symbol() {
        let source = mock_source(
            FeePolicy::TakerPlusMaker,
            FailurePolicy::Exclude,
            contracts(),
            rates(),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let results = screener.run().await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.ticker != "DDD"));
    }

    #[tokio::test]
    async fn test_substitute_zero_policy_keeps_failed_symbol() {
        let source = mock_source(
            FeePolicy::RoundTripMaker,
            FailurePolicy::SubstituteZero,
            contracts(),
            rates(),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let results = screener.run().await;
        assert_eq!(results.len(), 4);
        let ddd = results.iter().find(|r| r.ticker == "DDD").unwrap();
        assert_eq!(ddd.funding_rate, Decimal::ZERO);
        assert_eq!(ddd.funding_rate.to_string(), "0.000000");
        assert_eq!(ddd.potential_profit, dec!(-0.0006));
    }

    #[tokio::test]
    async fn test_rates_are_quantized_to_six_digits() {
        let source = mock_source(
            FeePolicy::TakerPlusMaker,
            FailurePolicy::SubstituteZero,
            contracts(),
            rates(),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        for result in screener.run().await {
            assert_eq!(result.funding_rate.scale(), 6, "{}", result.ticker);
        }
    }

    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let mut mock = MockFundingRateSource::new();
        mock.expect_venue().return_const(Venue::Mexc);
        mock.expect_list_contracts().returning(|| {
            Err(ExchangeError::Api {
                code: "510".into(),
                message: "Requests are too frequent".into(),
            })
        });

        let result = FundingScreener::new(Arc::new(mock), ScreenerSettings::default()).await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_contracts_are_not_refetched_per_run() {
        // list_contracts is expected exactly once by mock_source
        let source = mock_source(
            FeePolicy::TakerPlusMaker,
            FailurePolicy::Exclude,
            contracts(),
            rates(),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let first = screener.run().await;
        let second = screener.run().await;
        assert_eq!(first.len(), second.len());
        assert_eq!(screener.contracts().len(), 4);
    }

    #[test]
    fn test_overflow_is_reported_per_symbol() {
        let contract = Contract::new("HUGE", Decimal::MAX, Decimal::MAX);
        let quote = FundingQuote {
            symbol: "HUGE".into(),
            funding_rate: dec!(0.0001),
        };
        let err = RankedResult::from_quote(&contract, &quote, FeePolicy::TakerPlusMaker)
            .unwrap_err();
        assert!(matches!(err, ScreenerError::Overflow { ref symbol } if symbol == "HUGE"));
    }

    #[tokio::test]
    async fn test_overflowing_contract_is_skipped() {
        let source = mock_source(
            FeePolicy::TakerPlusMaker,
            FailurePolicy::Exclude,
            vec![
                Contract::new("AAA", dec!(0.0002), dec!(0.0002)),
                Contract::new("HUGE", Decimal::MAX, Decimal::MAX),
            ],
            HashMap::from([("AAA", dec!(0.001)), ("HUGE", dec!(0.001))]),
        );
        let screener = FundingScreener::new(source, ScreenerSettings::default())
            .await
            .unwrap();

        let results = screener.run().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "AAA");
    }

    /// Source with per-symbol latency that records peak concurrency.
    struct DelayedSource {
        delays: HashMap<String, Duration>,
        failing: HashSet<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl DelayedSource {
        fn new(delays: &[(&str, u64)], failing: &[&str]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(s, ms)| (s.to_string(), Duration::from_millis(*ms)))
                    .collect(),
                failing: failing.iter().map(|s| s.to_string()).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FundingRateSource for DelayedSource {
        fn venue(&self) -> Venue {
            Venue::Bybit
        }

        fn fee_policy(&self) -> FeePolicy {
            FeePolicy::TakerPlusMaker
        }

        fn failure_policy(&self) -> FailurePolicy {
            FailurePolicy::Exclude
        }

        async fn list_contracts(&self) -> Result<Vec<Contract>, ExchangeError> {
            let mut symbols: Vec<&String> = self.delays.keys().collect();
            symbols.sort();
            Ok(symbols
                .into_iter()
                .map(|s| Contract::new(s.clone(), Decimal::ZERO, Decimal::ZERO))
                .collect())
        }

        async fn fetch_funding_rate(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delays[symbol]).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(symbol) {
                return Err(ExchangeError::EmptyResult {
                    symbol: symbol.to_string(),
                });
            }
            Ok(quantize_rate(dec!(0.0001)))
        }
    }

    fn settings(concurrency: usize, timeout_ms: u64) -> ScreenerSettings {
        ScreenerSettings {
            concurrency,
            request_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_width_does_not_change_successes() {
        let delays: Vec<(String, u64)> = (0..12).map(|i| (format!("S{i:02}"), 5)).collect();
        let delays: Vec<(&str, u64)> = delays.iter().map(|(s, d)| (s.as_str(), *d)).collect();
        let failing = ["S03", "S07"];

        let mut successes = Vec::new();
        for width in [1, 50] {
            let source = Arc::new(DelayedSource::new(&delays, &failing));
            let screener = FundingScreener::new(source.clone(), settings(width, 5_000))
                .await
                .unwrap();
            let tickers: HashSet<String> =
                screener.run().await.into_iter().map(|r| r.ticker).collect();
            assert!(source.peak.load(Ordering::SeqCst) <= width);
            successes.push(tickers);
        }

        assert_eq!(successes[0].len(), 10);
        assert_eq!(successes[0], successes[1]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let delays: Vec<(String, u64)> = (0..20).map(|i| (format!("S{i:02}"), 10)).collect();
        let delays: Vec<(&str, u64)> = delays.iter().map(|(s, d)| (s.as_str(), *d)).collect();
        let source = Arc::new(DelayedSource::new(&delays, &[]));
        let screener = FundingScreener::new(source.clone(), settings(DEFAULT_CONCURRENCY, 5_000))
            .await
            .unwrap();

        assert_eq!(screener.run().await.len(), 20);
        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak <= DEFAULT_CONCURRENCY, "peak {peak}");
        assert!(peak > 1, "requests never overlapped");
    }

    #[tokio::test]
    async fn test_slow_request_times_out_without_blocking_others() {
        let source = Arc::new(DelayedSource::new(&[("FAST", 1), ("SLOW", 10_000)], &[]));
        let screener = FundingScreener::new(source, settings(5, 100))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let results = screener.run().await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "FAST");
    }

    #[tokio::test]
    async fn test_ties_keep_completion_order() {
        // Equal profits: the faster response ranks first
        let source = Arc::new(DelayedSource::new(&[("AAA", 200), ("BBB", 1)], &[]));
        let screener = FundingScreener::new(source, settings(5, 5_000))
            .await
            .unwrap();

        let results = screener.run().await;
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BBB", "AAA"]);
    }

    #[test]
    fn test_sort_by_profit_is_stable() {
        let make = |t: &str, p: Decimal| RankedResult {
            ticker: t.into(),
            funding_rate: p,
            potential_profit: p,
        };
        let mut results = vec![
            make("A", dec!(0.1)),
            make("B", dec!(0.3)),
            make("C", dec!(0.1)),
            make("D", dec!(0.2)),
        ];
        sort_by_profit(&mut results);
        let tickers: Vec<&str> = results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "D", "A", "C"]);
    }
}
