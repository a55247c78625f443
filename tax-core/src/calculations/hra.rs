//! House Rent Allowance exemption.
//!
//! The exempt portion of HRA is the smallest of:
//!
//! | Leg | Amount |
//! |-----|--------|
//! | 1   | HRA actually received |
//! | 2   | 50% of basic salary (metro) or 40% (non-metro) |
//! | 3   | Rent paid minus 10% of basic salary (not below zero) |
//!
//! The result is advisory. Callers may enter an exemption directly in
//! [`DeductionInputs::hra_exemption`](crate::models::DeductionInputs), which
//! takes precedence over this calculation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::common::{non_negative, round_rupee};
use crate::models::HraInputs;

const METRO_SHARE: Decimal = dec!(0.5);
const NON_METRO_SHARE: Decimal = dec!(0.4);
const RENT_EXCESS_SHARE: Decimal = dec!(0.1);

/// Computes the exempt HRA amount, rounded to the nearest rupee.
///
/// Returns zero when basic salary or rent paid is zero or negative.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::HraInputs;
/// use tax_core::calculations::hra_exemption;
///
/// let inputs = HraInputs {
///     basic_salary: dec!(600000),
///     hra_received: dec!(300000),
///     rent_paid_annual: dec!(240000),
///     is_metro: true,
/// };
///
/// assert_eq!(hra_exemption(&inputs), dec!(180000));
/// ```
pub fn hra_exemption(inputs: &HraInputs) -> Decimal {
    if inputs.basic_salary <= Decimal::ZERO || inputs.rent_paid_annual <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let share = if inputs.is_metro {
        METRO_SHARE
    } else {
        NON_METRO_SHARE
    };

    let received = non_negative(inputs.hra_received);
    let salary_share = inputs.basic_salary * share;
    let rent_excess = non_negative(inputs.rent_paid_annual - inputs.basic_salary * RENT_EXCESS_SHARE);

    round_rupee(received.min(salary_share).min(rent_excess))
}
