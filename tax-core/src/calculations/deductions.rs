//! Deduction aggregation for both regimes.
//!
//! The old regime caps each itemized section independently and adds a fixed
//! allowance:
//!
//! | Section     | Cap (built-in rules) |
//! |-------------|----------------------|
//! | §80C        | 1,50,000 |
//! | §80D self   | 25,000 (below 60) / 50,000 (60+) |
//! | §80D parents| 25,000 / 50,000 (senior parents) |
//! | §80CCD(1B)  | 50,000 |
//! | §24(b)      | 2,00,000 |
//! | §80TTA/TTB  | 10,000 (below 60) / 50,000 (60+) |
//! | HRA, professional tax, other | uncapped |
//! | Fixed allowance | 50,000 |
//!
//! The new regime ignores itemized inputs and grants a flat standard
//! deduction.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{capped, non_negative, saturating_sum};
use crate::models::{AgeBand, DeductionInputs, DeductionTotals};
use crate::rules::{DeductionPolicy, ItemizedCaps};

/// Applies a regime's [`DeductionPolicy`] to raw deduction inputs.
#[derive(Debug, Clone)]
pub struct DeductionAggregator<'a> {
    policy: &'a DeductionPolicy,
}

impl<'a> DeductionAggregator<'a> {
    pub fn new(policy: &'a DeductionPolicy) -> Self {
        Self { policy }
    }

    /// Caps and sums the deductions the policy allows.
    ///
    /// `interest_income` comes from the income profile and is the basis for
    /// the §80TTA / §80TTB relief.
    pub fn aggregate(
        &self,
        inputs: &DeductionInputs,
        age_band: AgeBand,
        interest_income: Decimal,
    ) -> DeductionTotals {
        let totals = match self.policy {
            DeductionPolicy::Standard { amount } => DeductionTotals {
                standard_deduction: *amount,
                total: *amount,
                ..Default::default()
            },
            DeductionPolicy::Itemized(caps) => {
                self.itemized(caps, inputs, age_band, interest_income)
            }
        };

        debug!(total = %totals.total, %age_band, "aggregated deductions");
        totals
    }

    fn itemized(
        &self,
        caps: &ItemizedCaps,
        inputs: &DeductionInputs,
        age_band: AgeBand,
        interest_income: Decimal,
    ) -> DeductionTotals {
        let valid_80c = capped(inputs.section_80c, caps.section_80c);
        let valid_80d = self.medical_insurance(caps, inputs, age_band);
        let valid_80ccd_1b = capped(inputs.nps_80ccd_1b, caps.nps_80ccd_1b);
        let valid_home_loan = capped(inputs.home_loan_interest, caps.home_loan_interest);
        let valid_80tta_ttb = self.interest_relief(caps, age_band, interest_income);
        let hra_exemption = non_negative(inputs.hra_exemption);
        let professional_tax = non_negative(inputs.professional_tax);
        let other_deductions = non_negative(inputs.other_deductions);
        let standard_deduction = caps.standard_deduction;

        let total = saturating_sum([
            valid_80c,
            valid_80d,
            valid_80ccd_1b,
            valid_home_loan,
            valid_80tta_ttb,
            hra_exemption,
            professional_tax,
            other_deductions,
            standard_deduction,
        ]);

        DeductionTotals {
            valid_80c,
            valid_80d,
            valid_80ccd_1b,
            valid_home_loan,
            valid_80tta_ttb,
            hra_exemption,
            professional_tax,
            other_deductions,
            standard_deduction,
            total,
        }
    }

    /// §80D: the self-and-family and parents legs are capped separately,
    /// then summed.
    fn medical_insurance(
        &self,
        caps: &ItemizedCaps,
        inputs: &DeductionInputs,
        age_band: AgeBand,
    ) -> Decimal {
        let self_cap = if age_band.is_senior() {
            caps.medical_self_senior
        } else {
            caps.medical_self
        };
        let parents_cap = if inputs.parents_senior {
            caps.medical_parents_senior
        } else {
            caps.medical_parents
        };

        saturating_sum([
            capped(inputs.medical_self, self_cap),
            capped(inputs.medical_parents, parents_cap),
        ])
    }

    /// §80TTA for the general band, §80TTB for seniors.
    fn interest_relief(
        &self,
        caps: &ItemizedCaps,
        age_band: AgeBand,
        interest_income: Decimal,
    ) -> Decimal {
        let cap = if age_band.is_senior() {
            caps.senior_interest
        } else {
            caps.savings_interest
        };
        capped(interest_income, cap)
    }
}

/// Taxable income after deductions, never below zero.
pub fn taxable_income(
    total_income: Decimal,
    deductions: &DeductionTotals,
) -> Decimal {
    non_negative(total_income - deductions.total)
}
