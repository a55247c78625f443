//! Tiered surcharge with marginal relief.
//!
//! The surcharge rate is chosen by taxable income, independently of the
//! slab brackets, and applied to the tax left after the §87A rebate.
//!
//! Marginal relief: once income `I` passes a tier's lower bound `T`, tax
//! plus surcharge at `I` may exceed tax plus surcharge at exactly `T` by no
//! more than `I − T`. The surplus is deducted from the surcharge.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::rules::SurchargeTier;

/// Surcharge for one regime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeOutcome {
    pub rate: Decimal,
    /// `tax_after_rebate × rate`, before marginal relief.
    pub gross_surcharge: Decimal,
    pub marginal_relief: Decimal,
    /// Surcharge payable: `gross_surcharge − marginal_relief`.
    pub surcharge: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct SurchargeCalculator<'a> {
    tiers: &'a [SurchargeTier],
}

impl<'a> SurchargeCalculator<'a> {
    /// `tiers` must be ascending by lower bound, as
    /// [`RegimeRules::validate`](crate::rules::RegimeRules::validate) ensures.
    pub fn new(tiers: &'a [SurchargeTier]) -> Self {
        Self { tiers }
    }

    fn active_tier(
        &self,
        taxable_income: Decimal,
    ) -> Option<&'a SurchargeTier> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| taxable_income > tier.above)
    }

    /// Rate applying to `taxable_income`; zero below the first tier.
    pub fn rate_for(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        self.active_tier(taxable_income)
            .map(|tier| tier.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Computes the surcharge on `tax_after_rebate`.
    ///
    /// `tax_at` returns the post-rebate tax for an arbitrary taxable income;
    /// it is evaluated at the active tier's lower bound to work out marginal
    /// relief.
    pub fn calculate<F>(
        &self,
        tax_after_rebate: Decimal,
        taxable_income: Decimal,
        tax_at: F,
    ) -> SurchargeOutcome
    where
        F: Fn(Decimal) -> Decimal,
    {
        let Some(tier) = self.active_tier(taxable_income) else {
            return SurchargeOutcome::default();
        };

        let tax = non_negative(tax_after_rebate);
        let gross_surcharge = tax * tier.rate;

        let threshold = tier.above;
        let threshold_tax = tax_at(threshold);
        let threshold_liability = threshold_tax + threshold_tax * self.rate_for(threshold);
        let ceiling = threshold_liability + (taxable_income - threshold);

        let marginal_relief = non_negative(tax + gross_surcharge - ceiling).min(gross_surcharge);

        SurchargeOutcome {
            rate: tier.rate,
            gross_surcharge,
            marginal_relief,
            surcharge: gross_surcharge - marginal_relief,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::slab::SlabTaxCalculator;
    use crate::models::{AgeBand, Regime, SlabTable, TaxYear};
    use crate::rules::TaxRulebook;

    fn rules_for(regime: Regime) -> (SlabTable, Vec<SurchargeTier>) {
        let rulebook = TaxRulebook::builtin();
        let year = TaxYear::FY_2025_26;
        let table = rulebook
            .slab_table(year, regime, AgeBand::General)
            .unwrap()
            .clone();
        let tiers = rulebook.regime_rules(year, regime).unwrap().surcharge.clone();
        (table, tiers)
    }

    // =========================================================================
    // rate_for tests
    // =========================================================================

    #[test]
    fn rate_tiers_for_old_regime() {
        let (_, tiers) = rules_for(Regime::Old);
        let calculator = SurchargeCalculator::new(&tiers);

        assert_eq!(calculator.rate_for(dec!(5000000)), dec!(0));
        assert_eq!(calculator.rate_for(dec!(5000001)), dec!(0.10));
        assert_eq!(calculator.rate_for(dec!(10000000)), dec!(0.10));
        assert_eq!(calculator.rate_for(dec!(15000000)), dec!(0.15));
        assert_eq!(calculator.rate_for(dec!(30000000)), dec!(0.25));
        assert_eq!(calculator.rate_for(dec!(50000001)), dec!(0.37));
    }

    #[test]
    fn new_regime_rate_never_exceeds_25_percent() {
        let (_, tiers) = rules_for(Regime::New);
        let calculator = SurchargeCalculator::new(&tiers);

        assert_eq!(calculator.rate_for(dec!(30000000)), dec!(0.25));
        assert_eq!(calculator.rate_for(dec!(500000000)), dec!(0.25));
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn no_surcharge_at_or_below_first_tier() {
        let (table, tiers) = rules_for(Regime::Old);
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeCalculator::new(&tiers);
        let income = dec!(5000000);

        let outcome = calculator.calculate(slab.base_tax(income), income, |i| slab.base_tax(i));

        assert_eq!(outcome, SurchargeOutcome::default());
    }

    #[test]
    fn ten_percent_without_relief_well_inside_tier() {
        let (table, tiers) = rules_for(Regime::Old);
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeCalculator::new(&tiers);
        let income = dec!(6000000);
        let tax = slab.base_tax(income);

        let outcome = calculator.calculate(tax, income, |i| slab.base_tax(i));

        assert_eq!(tax, dec!(1612500));
        assert_eq!(outcome.rate, dec!(0.10));
        assert_eq!(outcome.surcharge, tax * dec!(0.10));
        assert_eq!(outcome.marginal_relief, dec!(0));
    }

    #[test]
    fn relief_limits_increase_to_the_extra_income_at_first_tier() {
        let (table, tiers) = rules_for(Regime::New);
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeCalculator::new(&tiers);
        let income = dec!(5000001);
        let tax = slab.base_tax(income);

        let outcome = calculator.calculate(tax, income, |i| slab.base_tax(i));

        assert_eq!(tax, dec!(1080000.30));
        assert_eq!(outcome.gross_surcharge, dec!(108000.030));
        assert_eq!(outcome.surcharge, dec!(0.70));
        assert_eq!(tax + outcome.surcharge, dec!(1080001.00));
    }

    #[test]
    fn relief_at_higher_tier_uses_lower_tier_rate_at_threshold() {
        let (table, tiers) = rules_for(Regime::Old);
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeCalculator::new(&tiers);
        let threshold = dec!(10000000);
        let income = threshold + dec!(1);
        let tax = slab.base_tax(income);

        let outcome = calculator.calculate(tax, income, |i| slab.base_tax(i));

        // Tax plus 10% surcharge at exactly 1 crore, plus the extra rupee.
        let at_threshold = slab.base_tax(threshold) * dec!(1.10);
        assert_eq!(outcome.rate, dec!(0.15));
        assert_eq!(tax + outcome.surcharge, at_threshold + dec!(1));
    }

    #[test]
    fn relief_never_exceeds_gross_surcharge() {
        let (table, tiers) = rules_for(Regime::Old);
        let slab = SlabTaxCalculator::new(&table);
        let calculator = SurchargeCalculator::new(&tiers);

        for income in [dec!(5000000.01), dec!(5100000), dec!(20000001), dec!(50000001)] {
            let outcome = calculator.calculate(slab.base_tax(income), income, |i| slab.base_tax(i));

            assert!(outcome.marginal_relief <= outcome.gross_surcharge);
            assert!(outcome.surcharge >= dec!(0));
        }
    }

    #[test]
    fn empty_tiers_mean_no_surcharge() {
        let calculator = SurchargeCalculator::new(&[]);

        let outcome = calculator.calculate(dec!(5000000), dec!(100000000), |_| dec!(0));

        assert_eq!(outcome, SurchargeOutcome::default());
    }
}
