//! Old-versus-new regime comparison.
//!
//! For each regime the pipeline is:
//!
//! | Step | Stage |
//! |------|-------|
//! | 1    | Aggregate deductions under the regime's policy |
//! | 2    | Taxable income = total income − deductions (minimum 0) |
//! | 3    | Base tax from the (year, regime, age band) slab table |
//! | 4    | §87A rebate (full, or marginal relief above the threshold) |
//! | 5    | Surcharge on the post-rebate tax, with marginal relief |
//! | 6    | Cess on tax after rebate plus surcharge |
//! | 7    | Total tax = Step 4 tax + Step 5 surcharge + Step 6 cess |
//!
//! The regime with the lower total tax is recommended; a tie recommends the
//! old regime.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::{
//!     AgeBand, DeductionInputs, IncomeProfile, Regime, RegimeConfig, TaxYear, compare,
//! };
//!
//! let income = IncomeProfile::salaried(dec!(1200000));
//! let config = RegimeConfig::new(TaxYear::FY_2025_26, AgeBand::General);
//!
//! let result = compare(&income, &DeductionInputs::default(), &config).unwrap();
//!
//! assert_eq!(result.new.taxable_income, dec!(1125000));
//! assert_eq!(result.new.breakdown.total_tax, dec!(0));
//! assert_eq!(result.old.breakdown.total_tax, dec!(163800));
//! assert_eq!(result.recommended_regime, Regime::New);
//! assert_eq!(result.savings_amount, dec!(163800));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::cess::cess;
use crate::calculations::deductions::{DeductionAggregator, taxable_income};
use crate::calculations::rebate::RebateEngine;
use crate::calculations::slab::SlabTaxCalculator;
use crate::calculations::surcharge::SurchargeCalculator;
use crate::models::{
    ComparisonResult, DeductionInputs, IncomeProfile, Regime, RegimeConfig, RegimeOutcome,
    SlabTable, TaxBreakdown,
};
use crate::rules::{ConfigurationGap, RegimeRules, TaxRulebook};

/// Runs the regime pipeline against a [`TaxRulebook`].
#[derive(Debug, Clone, Copy)]
pub struct RegimeComparator<'a> {
    rulebook: &'a TaxRulebook,
}

impl<'a> RegimeComparator<'a> {
    pub fn new(rulebook: &'a TaxRulebook) -> Self {
        Self { rulebook }
    }

    /// Computes both regimes and recommends the cheaper one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationGap`] if the rulebook lacks a slab table or
    /// regime rules for either regime under `config`.
    pub fn compare(
        &self,
        income: &IncomeProfile,
        deductions: &DeductionInputs,
        config: &RegimeConfig,
    ) -> Result<ComparisonResult, ConfigurationGap> {
        let old = self.evaluate(Regime::Old, income, deductions, config)?;
        let new = self.evaluate(Regime::New, income, deductions, config)?;

        let savings = old.total_tax() - new.total_tax();
        let recommended_regime = if savings > Decimal::ZERO {
            Regime::New
        } else {
            Regime::Old
        };

        debug!(
            year = %config.year,
            age_band = %config.age_band,
            old_tax = %old.total_tax(),
            new_tax = %new.total_tax(),
            recommended = %recommended_regime,
            "compared regimes"
        );

        Ok(ComparisonResult {
            old,
            new,
            total_income: income.total_income(),
            recommended_regime,
            savings_amount: savings.abs(),
        })
    }

    /// Computes one regime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationGap`] if the rulebook lacks the slab table or
    /// the rules for this regime.
    pub fn evaluate(
        &self,
        regime: Regime,
        income: &IncomeProfile,
        deductions: &DeductionInputs,
        config: &RegimeConfig,
    ) -> Result<RegimeOutcome, ConfigurationGap> {
        let table = self
            .rulebook
            .slab_table(config.year, regime, config.age_band)?;
        let rules = self.rulebook.regime_rules(config.year, regime)?;

        let totals = DeductionAggregator::new(&rules.deductions).aggregate(
            deductions,
            config.age_band,
            income.interest_income,
        );
        let taxable_income = taxable_income(income.total_income(), &totals);
        let breakdown = self.breakdown(table, rules, taxable_income);

        debug!(
            %regime,
            %taxable_income,
            base_tax = %breakdown.base_tax,
            total_tax = %breakdown.total_tax,
            "evaluated regime"
        );

        Ok(RegimeOutcome {
            regime,
            taxable_income,
            deductions: totals,
            breakdown,
        })
    }

    fn breakdown(
        &self,
        table: &SlabTable,
        rules: &RegimeRules,
        taxable_income: Decimal,
    ) -> TaxBreakdown {
        let slab = SlabTaxCalculator::new(table);
        let rebate_engine = RebateEngine::from_rules(rules);

        let slab_result = slab.calculate(taxable_income);
        let rebate = rebate_engine.apply(slab_result.base_tax, taxable_income);

        let tax_at = |income: Decimal| {
            rebate_engine
                .apply(slab.base_tax(income), income)
                .tax_after_rebate
        };
        let surcharge = SurchargeCalculator::new(&rules.surcharge).calculate(
            rebate.tax_after_rebate,
            taxable_income,
            tax_at,
        );

        let cess = cess(rebate.tax_after_rebate, surcharge.surcharge, rules.cess_rate);
        let total_tax = rebate.tax_after_rebate + surcharge.surcharge + cess;

        TaxBreakdown {
            base_tax: slab_result.base_tax,
            rebate: rebate.rebate,
            rebate_kind: rebate.kind,
            tax_after_rebate: rebate.tax_after_rebate,
            surcharge_rate: surcharge.rate,
            surcharge: surcharge.surcharge,
            marginal_relief: surcharge.marginal_relief,
            cess,
            total_tax,
            bracket_amounts: slab_result.bracket_amounts,
        }
    }
}

/// Compares both regimes under the built-in rules.
///
/// # Errors
///
/// Returns [`ConfigurationGap`] for a fiscal year the built-in rulebook does
/// not cover.
pub fn compare(
    income: &IncomeProfile,
    deductions: &DeductionInputs,
    config: &RegimeConfig,
) -> Result<ComparisonResult, ConfigurationGap> {
    RegimeComparator::new(TaxRulebook::builtin_ref()).compare(income, deductions, config)
}
