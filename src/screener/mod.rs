//! Funding rate screening.
//!
//! - `funding`: per-venue fan-out, fee netting and ranking
//! - `manager`: runs all venues and truncates to the top K
//! - `report`: flat text and log rendering

mod funding;
mod manager;
mod report;

pub use funding::{
    sort_by_profit, FundingScreener, RankedResult, ScreenerError, ScreenerSettings,
    DEFAULT_CONCURRENCY,
};
pub use manager::{top_k, ExchangeReport, ScreenerManager, DEFAULT_TOP_K};
pub use report::{coin_line, header_line, log_report, render_report, write_report};
