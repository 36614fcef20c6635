//! Funding Screener - Main Entry Point
//!
//! One pass: list contracts on every enabled exchange, fetch funding rates,
//! rank by potential profit and write the top results to a flat report.

use anyhow::Result;
use clap::Parser;
use funding_screener::config::Config;
use funding_screener::exchange::{self, FundingRateSource, Venue};
use funding_screener::screener::{log_report, write_report, ScreenerManager};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Funding Screener CLI
#[derive(Parser)]
#[command(name = "funding-screener")]
#[command(version, about = "Rank perpetual funding rates net of trading fees")]
struct Cli {
    /// Config file (default: ./screener.{toml,yaml,json} if present)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of coins to keep per exchange
    #[arg(short, long)]
    top: Option<usize>,

    /// Report file, overwritten each run
    #[arg(short, long)]
    output: Option<String>,

    /// Concurrent funding rate requests per exchange
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exchange to screen (repeatable; overrides the configured list)
    #[arg(short, long = "exchange")]
    exchanges: Vec<Venue>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(top) = self.top {
            config.screener.top_k = top;
        }
        if let Some(output) = &self.output {
            config.report.path = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.screener.concurrency = concurrency;
        }
        if !self.exchanges.is_empty() {
            config.exchanges.enabled = self.exchanges.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let _guard = init_logging()?;

    info!("Funding Screener v{}", env!("CARGO_PKG_VERSION"));
    log_config(&config);

    let sources = build_sources(&config);
    if sources.is_empty() {
        anyhow::bail!("No exchange client could be created");
    }

    let screen = ScreenerManager::screen(
        sources,
        config.screener_settings(),
        config.screener.top_k,
    );

    let reports = tokio::select! {
        reports = screen => reports,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning in-flight requests");
            return Ok(());
        }
    };

    log_report(&reports);
    write_report(&config.report.path, &reports)?;

    info!("Done");
    Ok(())
}

/// Create a client per enabled venue. A venue whose client cannot be built
/// is logged and skipped.
fn build_sources(config: &Config) -> Vec<Arc<dyn FundingRateSource>> {
    let timeout = config.request_timeout();
    config
        .exchanges
        .enabled
        .iter()
        .filter_map(|&venue| {
            match exchange::connect(venue, config.exchanges.base_url(venue), timeout) {
                Ok(source) => Some(source),
                Err(e) => {
                    error!("Failed to create {} client: {:#}", venue, e);
                    None
                }
            }
        })
        .collect()
}

/// Initialize logging to stdout and a daily-rolling file under `logs/`.
fn init_logging() -> Result<WorkerGuard> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "funding-screener.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("funding_screener=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(guard)
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    let enabled: Vec<String> = config
        .exchanges
        .enabled
        .iter()
        .map(|v| v.to_string())
        .collect();

    info!("Configuration:");
    info!("   Exchanges: {}", enabled.join(", "));
    info!("   Top K: {}", config.screener.top_k);
    info!("   Concurrency: {}", config.screener.concurrency);
    info!("   Request Timeout: {}s", config.screener.request_timeout_secs);
    info!("   Report: {}", config.report.path);
}
