//! Configuration management for the funding screener.
//!
//! Loads settings from an optional config file layered over defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::exchange::{binance, bybit, mexc, okx, Venue};
use crate::screener::{ScreenerSettings, DEFAULT_CONCURRENCY, DEFAULT_TOP_K};

/// Config file looked up when no explicit path is given (any supported extension).
pub const DEFAULT_CONFIG_NAME: &str = "screener";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fan-out and ranking parameters
    #[serde(default)]
    pub screener: ScreenerConfig,
    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
    /// Venue selection and endpoints
    #[serde(default)]
    pub exchanges: ExchangesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    /// Number of results kept per venue
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Maximum concurrent funding rate requests per venue
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Flat text report, overwritten each run
    #[serde(default = "default_report_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangesConfig {
    /// Venues to screen, in report order
    #[serde(default = "default_enabled")]
    pub enabled: Vec<Venue>,
    #[serde(default = "default_mexc_url")]
    pub mexc_url: String,
    #[serde(default = "default_bybit_url")]
    pub bybit_url: String,
    #[serde(default = "default_okx_url")]
    pub okx_url: String,
    #[serde(default = "default_binance_url")]
    pub binance_url: String,
}

// Default value functions
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_request_timeout() -> u64 {
    10
}

fn default_report_path() -> String {
    "results.txt".to_string()
}

fn default_enabled() -> Vec<Venue> {
    Venue::ALL.to_vec()
}

fn default_mexc_url() -> String {
    mexc::MAINNET_API_URL.to_string()
}

fn default_bybit_url() -> String {
    bybit::MAINNET_API_URL.to_string()
}

fn default_okx_url() -> String {
    okx::MAINNET_API_URL.to_string()
}

fn default_binance_url() -> String {
    binance::FUTURES_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from a config file, falling back to defaults.
    ///
    /// With `path == None` the optional `screener.{toml,yaml,json}` in the
    /// working directory is used. An explicit path must exist.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.screener.top_k > 0, "top_k must be at least 1");
        anyhow::ensure!(
            self.screener.concurrency > 0,
            "concurrency must be at least 1"
        );
        anyhow::ensure!(
            self.screener.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        anyhow::ensure!(
            !self.exchanges.enabled.is_empty(),
            "at least one exchange must be enabled"
        );
        anyhow::ensure!(!self.report.path.is_empty(), "report path must not be empty");

        Ok(())
    }

    /// Fan-out settings for each screener.
    pub fn screener_settings(&self) -> ScreenerSettings {
        ScreenerSettings {
            concurrency: self.screener.concurrency,
            request_timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.screener.request_timeout_secs)
    }
}

impl ExchangesConfig {
    /// Base URL configured for `venue`.
    pub fn base_url(&self, venue: Venue) -> &str {
        match venue {
            Venue::Mexc => &self.mexc_url,
            Venue::Bybit => &self.bybit_url,
            Venue::Okx => &self.okx_url,
            Venue::Binance => &self.binance_url,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screener: ScreenerConfig::default(),
            report: ReportConfig::default(),
            exchanges: ExchangesConfig::default(),
        }
    }
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
        }
    }
}

impl Default for ExchangesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            mexc_url: default_mexc_url(),
            bybit_url: default_bybit_url(),
            okx_url: default_okx_url(),
            binance_url: default_binance_url(),
        }
    }
}
