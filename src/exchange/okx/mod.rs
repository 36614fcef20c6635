//! OKX v5 perpetual swap integration.
//!
//! Instruments are requested with `instType=SWAP`, so the API already
//! excludes dated futures. Ranked with the taker+maker fee convention;
//! failed symbols are dropped.

mod client;
mod types;

pub use client::{OkxClient, MAINNET_API_URL};
pub use types::*;
