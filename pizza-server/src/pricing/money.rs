//! Decimal helpers for monetary values
//!
//! Arithmetic happens on `Decimal`; values are stored and serialized as `f64`
//! rounded to 2 decimal places, half away from zero.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Maximum accepted single price (pizza base or topping)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum accepted cart total and offer amount
pub const MAX_CART_TOTAL: f64 = 1_000_000_000_000.0;

/// Convert f64 to Decimal. NaN and infinities become zero.
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert an amount to Decimal clamped to `[0, max]`
///
/// NaN and infinities become zero. With both operands bounded, products and
/// sums of a few hundred thousand terms stay far below `Decimal::MAX`.
#[inline]
pub(crate) fn bounded(value: f64, max: f64) -> Decimal {
    if value.is_finite() {
        to_decimal(value.clamp(0.0, max))
    } else {
        Decimal::ZERO
    }
}

#[inline]
pub(crate) fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}
