use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, saturating_sum};
use crate::models::{AgeBand, TaxYear};

/// Income for one calculation. Negative fields are treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeProfile {
    pub gross_salary: Decimal,
    pub other_income: Decimal,
    /// Savings and deposit interest. Part of total income, and also the
    /// basis for the §80TTA / §80TTB relief in the old regime.
    pub interest_income: Decimal,
}

impl IncomeProfile {
    pub fn salaried(gross_salary: Decimal) -> Self {
        Self {
            gross_salary,
            ..Default::default()
        }
    }

    /// Sum of the income fields; saturates at [`Decimal::MAX`].
    pub fn total_income(&self) -> Decimal {
        saturating_sum([
            non_negative(self.gross_salary),
            non_negative(self.other_income),
            non_negative(self.interest_income),
        ])
    }
}

/// Raw itemized deduction amounts, before any statutory cap is applied.
///
/// Only the old regime reads these; every field defaults to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeductionInputs {
    /// §80C investments (PPF, ELSS, life insurance, principal repayment...).
    pub section_80c: Decimal,
    /// §80D medical insurance for self, spouse and children.
    pub medical_self: Decimal,
    /// §80D medical insurance for parents.
    pub medical_parents: Decimal,
    /// Whether the insured parents are senior citizens.
    pub parents_senior: bool,
    /// Additional NPS contribution under §80CCD(1B).
    pub nps_80ccd_1b: Decimal,
    /// Exempt portion of house-rent allowance, entered directly or taken
    /// from [`hra_exemption`](crate::calculations::hra_exemption).
    pub hra_exemption: Decimal,
    /// Interest on a self-occupied home loan (§24(b)).
    pub home_loan_interest: Decimal,
    pub professional_tax: Decimal,
    pub other_deductions: Decimal,
}

/// Inputs for the HRA exemption calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HraInputs {
    pub basic_salary: Decimal,
    pub hra_received: Decimal,
    pub rent_paid_annual: Decimal,
    pub is_metro: bool,
}

/// Selects which rules apply to a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeConfig {
    pub year: TaxYear,
    #[serde(default)]
    pub age_band: AgeBand,
}

impl RegimeConfig {
    pub fn new(
        year: TaxYear,
        age_band: AgeBand,
    ) -> Self {
        Self { year, age_band }
    }
}
