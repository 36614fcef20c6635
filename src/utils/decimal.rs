//! Decimal arithmetic utilities for funding rate calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Number of fractional digits every funding rate is quantized to.
pub const FUNDING_RATE_SCALE: u32 = 6;

/// Quantize a funding rate to exactly six fractional digits.
///
/// Uses round-half-even (banker's rounding), then pads the scale so the
/// value always renders with six digits (`0.0001` becomes `0.000100`).
pub fn quantize_rate(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(FUNDING_RATE_SCALE, RoundingStrategy::MidpointNearestEven);
    // Scale is at most FUNDING_RATE_SCALE here, so rescaling only pads zeros.
    rounded.rescale(FUNDING_RATE_SCALE);
    rounded
}

/// Render a fractional rate as a percentage with six decimals (`0.0006` -> `0.060000%`).
///
/// A rate whose percentage does not fit in a `Decimal` is rendered as the
/// raw fraction, without the `%` suffix.
pub fn format_percentage(rate: Decimal) -> String {
    let Some(pct) = rate.checked_mul(dec!(100)) else {
        return rate.to_string();
    };
    let mut pct = pct.round_dp_with_strategy(6, RoundingStrategy::MidpointNearestEven);
    pct.rescale(6);
    format!("{}%", pct)
}
