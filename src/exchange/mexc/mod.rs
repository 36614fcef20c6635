//! MEXC contract (futures) integration.
//!
//! Every listed contract is a perpetual, so no filtering is applied.
//! Ranked with the round-trip maker fee convention; failed symbols are
//! dropped.

mod client;
mod types;

pub use client::{MexcClient, MAINNET_API_URL};
pub use types::*;
