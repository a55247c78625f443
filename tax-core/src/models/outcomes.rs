use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Regime;

/// Deductions after statutory caps, for one regime.
///
/// In the new regime every itemized field is zero and `total` equals the
/// flat `standard_deduction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionTotals {
    pub valid_80c: Decimal,
    pub valid_80d: Decimal,
    pub valid_80ccd_1b: Decimal,
    pub valid_home_loan: Decimal,
    /// §80TTA (general) or §80TTB (senior and super senior) interest relief.
    pub valid_80tta_ttb: Decimal,
    pub hra_exemption: Decimal,
    pub professional_tax: Decimal,
    pub other_deductions: Decimal,
    /// Fixed allowance granted without proof: 50,000 in the old regime,
    /// 75,000 in the new regime (built-in rules).
    pub standard_deduction: Decimal,
    pub total: Decimal,
}

/// Tax accrued inside one slab bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketAmount {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    /// Income falling inside the bracket.
    pub taxable_amount: Decimal,
    pub tax: Decimal,
}

/// How the §87A rebate was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RebateKind {
    /// Income above the threshold and no taper applies.
    #[default]
    None,
    /// Income at or below the threshold: the whole tax is rebated.
    Full,
    /// Income just above the threshold: tax capped at the excess income.
    MarginalRelief,
}

/// Every stage of the tax computation for one regime.
///
/// `total_tax = base_tax - rebate + surcharge + cess`. `surcharge` is the
/// amount payable after `marginal_relief` has been deducted from the gross
/// surcharge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub base_tax: Decimal,
    pub rebate: Decimal,
    pub rebate_kind: RebateKind,
    pub tax_after_rebate: Decimal,
    pub surcharge_rate: Decimal,
    pub surcharge: Decimal,
    pub marginal_relief: Decimal,
    pub cess: Decimal,
    pub total_tax: Decimal,
    pub bracket_amounts: Vec<BracketAmount>,
}

/// A regime's breakdown together with the taxable income and deductions
/// it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeOutcome {
    pub regime: Regime,
    pub taxable_income: Decimal,
    pub deductions: DeductionTotals,
    pub breakdown: TaxBreakdown,
}

impl RegimeOutcome {
    pub fn total_tax(&self) -> Decimal {
        self.breakdown.total_tax
    }
}

/// Side-by-side result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub old: RegimeOutcome,
    pub new: RegimeOutcome,
    pub total_income: Decimal,
    pub recommended_regime: Regime,
    /// Absolute difference between the two regimes' total tax.
    pub savings_amount: Decimal,
}

impl ComparisonResult {
    pub fn outcome(
        &self,
        regime: Regime,
    ) -> &RegimeOutcome {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    pub fn recommended(&self) -> &RegimeOutcome {
        self.outcome(self.recommended_regime)
    }
}
