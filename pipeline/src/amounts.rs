//! Monetary arithmetic shared by both pipelines.
//!
//! All quoted and recorded amounts are carried as `Decimal` and rounded to
//! 8 decimal places, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Scale applied to every monetary figure returned to callers.
pub const AMOUNT_SCALE: u32 = 8;

/// Round to 8 decimal places, half away from zero, keeping the scale fixed
/// so serialized amounts always render with 8 fractional digits.
pub fn round_amount(v: Decimal) -> Decimal {
    let mut rounded = v.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// Percentage deviation implied by accepting `floor` instead of `expected`.
///
/// Caller must ensure `expected > 0`.
pub fn implied_slippage_pct(expected: Decimal, floor: Decimal) -> Decimal {
    (expected - floor) / expected * Decimal::ONE_HUNDRED
}

/// Output floor implied by a tolerance in percent.
pub fn floor_for_tolerance(expected: Decimal, tolerance_pct: Decimal) -> Decimal {
    round_amount(expected * (Decimal::ONE - tolerance_pct / Decimal::ONE_HUNDRED))
}
