//! Section 87A rebate.
//!
//! Taxable income at or below the regime's threshold pays no tax. Where the
//! regime allows marginal relief, tax just above the threshold is capped at
//! the amount by which income exceeds it, so crossing the threshold by one
//! rupee never costs more than one rupee.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::models::RebateKind;
use crate::rules::RegimeRules;

/// Rebate granted and the tax left after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateOutcome {
    pub rebate: Decimal,
    pub tax_after_rebate: Decimal,
    pub kind: RebateKind,
}

/// Applies the §87A rebate for one regime.
#[derive(Debug, Clone, Copy)]
pub struct RebateEngine {
    threshold: Decimal,
    marginal_relief: bool,
}

impl RebateEngine {
    pub fn new(
        threshold: Decimal,
        marginal_relief: bool,
    ) -> Self {
        Self {
            threshold,
            marginal_relief,
        }
    }

    pub fn from_rules(rules: &RegimeRules) -> Self {
        Self::new(rules.rebate_threshold, rules.rebate_marginal_relief)
    }

    pub fn apply(
        &self,
        base_tax: Decimal,
        taxable_income: Decimal,
    ) -> RebateOutcome {
        let base_tax = non_negative(base_tax);

        let (rebate, kind) = if taxable_income <= self.threshold {
            (base_tax, RebateKind::Full)
        } else if self.marginal_relief {
            let excess = taxable_income - self.threshold;
            if base_tax > excess {
                (base_tax - excess, RebateKind::MarginalRelief)
            } else {
                (Decimal::ZERO, RebateKind::None)
            }
        } else {
            (Decimal::ZERO, RebateKind::None)
        };

        RebateOutcome {
            rebate,
            tax_after_rebate: non_negative(base_tax - rebate),
            kind,
        }
    }
}
