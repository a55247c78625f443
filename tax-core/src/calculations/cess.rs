//! Health and education cess.

use rust_decimal::Decimal;

use crate::calculations::common::non_negative;

/// Cess on the tax after rebate plus the surcharge payable. No cap and no
/// threshold.
pub fn cess(
    tax_after_rebate: Decimal,
    surcharge: Decimal,
    rate: Decimal,
) -> Decimal {
    non_negative(tax_after_rebate + surcharge) * rate
}
