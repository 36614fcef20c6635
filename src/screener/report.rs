//! Flat text rendering of screener results.
//!
//! ```text
//! ============ Top 2 coins in Okx ============
//! BTC-USDT-SWAP. Funding rate: 0.001000 - Potential Profit: 0.060000%
//! ETH-USDT-SWAP. Funding rate: 0.000500 - Potential Profit: 0.010000%
//! ```

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use super::funding::RankedResult;
use super::manager::ExchangeReport;
use crate::utils::format_percentage;

/// Header naming the number of rows that follow.
pub fn header_line(report: &ExchangeReport) -> String {
    format!(
        "============ Top {} coins in {} ============",
        report.coins.len(),
        report.exchange_name
    )
}

pub fn coin_line(coin: &RankedResult) -> String {
    format!(
        "{}. Funding rate: {} - Potential Profit: {}",
        coin.ticker,
        coin.funding_rate,
        format_percentage(coin.potential_profit)
    )
}

/// Render all reports, one header per venue followed by its coins.
pub fn render_report(reports: &[ExchangeReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(out, "{}", header_line(report));
        for coin in &report.coins {
            let _ = writeln!(out, "{}", coin_line(coin));
        }
    }
    out
}

/// Overwrite `path` with the rendered reports.
pub fn write_report(path: impl AsRef<Path>, reports: &[ExchangeReport]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_report(reports))
        .with_context(|| format!("Failed to write report to {:?}", path))?;
    info!(path = %path.display(), venues = reports.len(), "Report written");
    Ok(())
}

/// Emit the same lines as the report file through the log stream.
pub fn log_report(reports: &[ExchangeReport]) {
    for report in reports {
        info!(
            "Top {} coins in {}",
            report.coins.len(),
            report.exchange_name
        );
        for coin in &report.coins {
            info!("{}", coin_line(coin));
        }
    }
}
