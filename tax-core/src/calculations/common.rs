//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across the regime
//! calculators, including rounding and input coercion.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to the nearest whole rupee using half-up rounding.
///
/// Values at exactly 0.50 are rounded away from zero. Engine results are
/// kept unrounded; this is meant for display and for the HRA calculator,
/// whose contract is a whole-rupee amount.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_rupee;
///
/// assert_eq!(round_rupee(dec!(163799.49)), dec!(163799));
/// assert_eq!(round_rupee(dec!(163799.50)), dec!(163800));
/// assert_eq!(round_rupee(dec!(-10.5)), dec!(-11)); // Away from zero
/// ```
pub fn round_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Coerces a raw input amount to be non-negative.
///
/// The engine is a best-effort estimator: a negative amount is treated as
/// zero rather than rejected.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(-500.00)), dec!(0));
/// assert_eq!(non_negative(dec!(500.00)), dec!(500.00));
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    if value < Decimal::ZERO {
        Decimal::ZERO
    } else {
        value
    }
}

/// Caps a raw amount at `cap` after coercing it to be non-negative.
pub fn capped(
    value: Decimal,
    cap: Decimal,
) -> Decimal {
    non_negative(value).min(cap)
}

/// Adds non-negative amounts, stopping at [`Decimal::MAX`] instead of
/// overflowing.
pub fn saturating_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.checked_add(value).unwrap_or(Decimal::MAX))
}
