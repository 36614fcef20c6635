//! Runs the configured screeners and assembles per-venue reports.

use futures_util::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::funding::{FundingScreener, RankedResult, ScreenerSettings};
use crate::exchange::{FundingRateSource, Venue};

/// Default number of results kept per venue.
pub const DEFAULT_TOP_K: usize = 20;

/// Ranked results for one venue, truncated to the top K.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeReport {
    pub exchange_name: String,
    pub coins: Vec<RankedResult>,
}

/// Keep the first `k` entries of an already-ranked sequence.
pub fn top_k(mut results: Vec<RankedResult>, k: usize) -> Vec<RankedResult> {
    results.truncate(k);
    results
}

/// Owns one screener per venue and runs them side by side.
#[derive(Debug)]
pub struct ScreenerManager {
    screeners: Vec<FundingScreener>,
    unavailable: Vec<Venue>,
    top_k: usize,
}

impl ScreenerManager {
    pub fn new(screeners: Vec<FundingScreener>, top_k: usize) -> Self {
        Self {
            screeners,
            unavailable: Vec::new(),
            top_k,
        }
    }

    /// Build a screener per source. Venues whose contract listing fails are
    /// logged and left out; the rest proceed.
    #[instrument(skip_all, fields(venues = sources.len()))]
    pub async fn connect(
        sources: Vec<Arc<dyn FundingRateSource>>,
        settings: ScreenerSettings,
        top_k: usize,
    ) -> Self {
        let venues: Vec<Venue> = sources.iter().map(|s| s.venue()).collect();
        let built = join_all(
            sources
                .into_iter()
                .map(|source| FundingScreener::new(source, settings)),
        )
        .await;

        let mut screeners = Vec::with_capacity(built.len());
        let mut unavailable = Vec::new();
        for (venue, result) in venues.into_iter().zip(built) {
            match result {
                Ok(screener) => screeners.push(screener),
                Err(e) => {
                    error!(%venue, error = %e, "Failed to fetch contracts, skipping venue");
                    unavailable.push(venue);
                }
            }
        }

        info!(
            ready = screeners.len(),
            unavailable = unavailable.len(),
            "Screeners initialized"
        );

        Self {
            screeners,
            unavailable,
            top_k,
        }
    }

    pub fn screeners(&self) -> &[FundingScreener] {
        &self.screeners
    }

    /// Venues that could not be initialized.
    pub fn unavailable(&self) -> &[Venue] {
        &self.unavailable
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Connect and run in one pass. Dropping the returned future abandons
    /// both the contract listings and the funding rate requests.
    pub async fn screen(
        sources: Vec<Arc<dyn FundingRateSource>>,
        settings: ScreenerSettings,
        top_k: usize,
    ) -> Vec<ExchangeReport> {
        let manager = Self::connect(sources, settings, top_k).await;
        for venue in manager.unavailable() {
            warn!("{} skipped: contract listing failed", venue);
        }
        manager.run_all().await
    }

    /// Run every screener concurrently and return one report per venue,
    /// in configured order.
    #[instrument(skip(self), fields(screeners = self.screeners.len()))]
    pub async fn run_all(&self) -> Vec<ExchangeReport> {
        let runs = join_all(self.screeners.iter().map(|s| s.run())).await;

        self.screeners
            .iter()
            .zip(runs)
            .map(|(screener, results)| ExchangeReport {
                exchange_name: screener.name(),
                coins: top_k(results, self.top_k),
            })
            .collect()
    }
}
