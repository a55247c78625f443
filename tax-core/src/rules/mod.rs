//! Configuration data for the tax engine.
//!
//! Slab tables, rebate thresholds, surcharge tiers, the cess rate and the
//! deduction policy are data held in a [`TaxRulebook`], keyed by fiscal
//! year, regime and (for slab tables) age band. Adding a fiscal year means
//! inserting data, either through [`TaxRulebook::builtin`] or through the
//! loaders in the `tax-data` crate.
//!
//! A lookup for a key with no data is a [`ConfigurationGap`]. The rulebook
//! never falls back to another year's figures.

mod builtin;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AgeBand, Regime, SlabTable, TaxYear};

/// A request for rules that the rulebook does not hold.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationGap {
    /// No slab table for the `(year, regime, age band)` triple, either
    /// specific to the age band or shared by all bands.
    #[error("no slab table for the {regime} regime in {year} ({age_band} taxpayers)")]
    SlabTable {
        year: TaxYear,
        regime: Regime,
        age_band: AgeBand,
    },

    /// No rebate, surcharge, cess or deduction rules for `(year, regime)`.
    #[error("no {regime} regime rules for {year}")]
    RegimeRules { year: TaxYear, regime: Regime },
}

/// Errors raised when regime rules are internally inconsistent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegimeRulesError {
    #[error("rebate threshold must be non-negative, got {0}")]
    NegativeRebateThreshold(Decimal),

    #[error("cess rate must be between 0 and 1, got {0}")]
    InvalidCessRate(Decimal),

    #[error("surcharge rate must be between 0 and 1, got {0}")]
    InvalidSurchargeRate(Decimal),

    #[error("surcharge tiers must be in strictly ascending order (tier above {0} is out of order)")]
    SurchargeTiersNotAscending(Decimal),

    #[error("deduction cap or allowance must be non-negative, got {0}")]
    NegativeDeductionAmount(Decimal),
}

/// Surcharge applying to taxable income strictly above `above`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeTier {
    pub above: Decimal,
    pub rate: Decimal,
}

impl SurchargeTier {
    pub fn new(
        above: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { above, rate }
    }
}

/// Statutory caps for the old regime's itemized deductions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedCaps {
    /// §80C.
    pub section_80c: Decimal,
    /// §80D self and family, taxpayer below 60.
    pub medical_self: Decimal,
    /// §80D self and family, taxpayer 60 or older.
    pub medical_self_senior: Decimal,
    /// §80D parents below 60.
    pub medical_parents: Decimal,
    /// §80D parents 60 or older.
    pub medical_parents_senior: Decimal,
    /// §80CCD(1B).
    pub nps_80ccd_1b: Decimal,
    /// §24(b), self-occupied property.
    pub home_loan_interest: Decimal,
    /// §80TTA, general age band.
    pub savings_interest: Decimal,
    /// §80TTB, senior and super senior age bands.
    pub senior_interest: Decimal,
    /// Fixed allowance granted regardless of proof.
    pub standard_deduction: Decimal,
}

impl ItemizedCaps {
    fn amounts(&self) -> [Decimal; 10] {
        [
            self.section_80c,
            self.medical_self,
            self.medical_self_senior,
            self.medical_parents,
            self.medical_parents_senior,
            self.nps_80ccd_1b,
            self.home_loan_interest,
            self.savings_interest,
            self.senior_interest,
            self.standard_deduction,
        ]
    }
}

/// How a regime turns deduction inputs into a deduction total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeductionPolicy {
    /// Capped itemized deductions plus a fixed allowance.
    Itemized(ItemizedCaps),
    /// A flat standard deduction; itemized inputs are ignored.
    Standard { amount: Decimal },
}

/// Rebate, surcharge, cess and deduction rules for one `(year, regime)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    /// §87A: taxable income at or below this pays no tax.
    pub rebate_threshold: Decimal,
    /// Whether tax just above the threshold is capped at the excess income.
    #[serde(default)]
    pub rebate_marginal_relief: bool,
    pub cess_rate: Decimal,
    /// Ascending by `above`. Empty means no surcharge.
    #[serde(default)]
    pub surcharge: Vec<SurchargeTier>,
    pub deductions: DeductionPolicy,
}

impl RegimeRules {
    /// Checks rates lie in `[0, 1]`, amounts are non-negative and surcharge
    /// tiers ascend strictly.
    pub fn validate(&self) -> Result<(), RegimeRulesError> {
        if self.rebate_threshold < Decimal::ZERO {
            return Err(RegimeRulesError::NegativeRebateThreshold(
                self.rebate_threshold,
            ));
        }
        if !is_rate(self.cess_rate) {
            return Err(RegimeRulesError::InvalidCessRate(self.cess_rate));
        }

        let mut previous: Option<Decimal> = None;
        for tier in &self.surcharge {
            if !is_rate(tier.rate) {
                return Err(RegimeRulesError::InvalidSurchargeRate(tier.rate));
            }
            if tier.above < Decimal::ZERO || previous.is_some_and(|p| tier.above <= p) {
                return Err(RegimeRulesError::SurchargeTiersNotAscending(tier.above));
            }
            previous = Some(tier.above);
        }

        let amounts = match &self.deductions {
            DeductionPolicy::Itemized(caps) => caps.amounts().to_vec(),
            DeductionPolicy::Standard { amount } => vec![*amount],
        };
        if let Some(negative) = amounts.into_iter().find(|a| *a < Decimal::ZERO) {
            return Err(RegimeRulesError::NegativeDeductionAmount(negative));
        }

        Ok(())
    }
}

fn is_rate(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= Decimal::ONE
}

/// Lookup of every rule the engine needs, keyed by year, regime and age band.
///
/// Slab tables may be stored for a specific age band or, with `age_band` of
/// `None`, for all bands of that `(year, regime)`. A band-specific table
/// takes precedence over the shared one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxRulebook {
    slab_tables: BTreeMap<(TaxYear, Regime, Option<AgeBand>), SlabTable>,
    regime_rules: BTreeMap<(TaxYear, Regime), RegimeRules>,
}

impl TaxRulebook {
    /// An empty rulebook. Every lookup is a [`ConfigurationGap`] until data
    /// is inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a slab table, returning the one it replaced.
    pub fn insert_slab_table(
        &mut self,
        year: TaxYear,
        regime: Regime,
        age_band: Option<AgeBand>,
        table: SlabTable,
    ) -> Option<SlabTable> {
        self.slab_tables.insert((year, regime, age_band), table)
    }

    /// Validates and stores regime rules, returning the ones they replaced.
    ///
    /// # Errors
    ///
    /// Returns [`RegimeRulesError`] if the rules fail [`RegimeRules::validate`];
    /// the rulebook is left unchanged.
    pub fn insert_regime_rules(
        &mut self,
        year: TaxYear,
        regime: Regime,
        rules: RegimeRules,
    ) -> Result<Option<RegimeRules>, RegimeRulesError> {
        rules.validate()?;
        Ok(self.regime_rules.insert((year, regime), rules))
    }

    /// Resolves the slab table for a `(year, regime, age band)` triple.
    pub fn slab_table(
        &self,
        year: TaxYear,
        regime: Regime,
        age_band: AgeBand,
    ) -> Result<&SlabTable, ConfigurationGap> {
        self.slab_tables
            .get(&(year, regime, Some(age_band)))
            .or_else(|| self.slab_tables.get(&(year, regime, None)))
            .ok_or(ConfigurationGap::SlabTable {
                year,
                regime,
                age_band,
            })
    }

    pub fn regime_rules(
        &self,
        year: TaxYear,
        regime: Regime,
    ) -> Result<&RegimeRules, ConfigurationGap> {
        self.regime_rules
            .get(&(year, regime))
            .ok_or(ConfigurationGap::RegimeRules { year, regime })
    }

    /// Fiscal years with rules for at least one regime, ascending.
    pub fn years(&self) -> Vec<TaxYear> {
        let mut years: Vec<TaxYear> = self.regime_rules.keys().map(|(y, _)| *y).collect();
        years.dedup();
        years
    }

    /// Copies every table and rule set from `other` over this rulebook.
    pub fn merge(
        &mut self,
        other: TaxRulebook,
    ) {
        self.slab_tables.extend(other.slab_tables);
        self.regime_rules.extend(other.regime_rules);
    }

    pub fn slab_table_count(&self) -> usize {
        self.slab_tables.len()
    }

    pub fn regime_rules_count(&self) -> usize {
        self.regime_rules.len()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::SlabBracket;

    fn flat_table(rate: Decimal) -> SlabTable {
        SlabTable::new(vec![SlabBracket::new(dec!(0), None, rate)]).unwrap()
    }

    fn standard_rules() -> RegimeRules {
        RegimeRules {
            rebate_threshold: dec!(700000),
            rebate_marginal_relief: true,
            cess_rate: dec!(0.04),
            surcharge: vec![
                SurchargeTier::new(dec!(5000000), dec!(0.10)),
                SurchargeTier::new(dec!(10000000), dec!(0.15)),
            ],
            deductions: DeductionPolicy::Standard {
                amount: dec!(75000),
            },
        }
    }

    // =========================================================================
    // slab_table lookup tests
    // =========================================================================

    #[test]
    fn slab_table_prefers_age_band_specific_table() {
        let mut rulebook = TaxRulebook::new();
        let year = TaxYear::FY_2024_25;
        rulebook.insert_slab_table(year, Regime::Old, None, flat_table(dec!(0.1)));
        rulebook.insert_slab_table(
            year,
            Regime::Old,
            Some(AgeBand::Senior),
            flat_table(dec!(0.2)),
        );

        let senior = rulebook
            .slab_table(year, Regime::Old, AgeBand::Senior)
            .unwrap();
        let general = rulebook
            .slab_table(year, Regime::Old, AgeBand::General)
            .unwrap();

        assert_eq!(senior.brackets()[0].rate, dec!(0.2));
        assert_eq!(general.brackets()[0].rate, dec!(0.1));
    }

    #[test]
    fn slab_table_missing_year_is_a_configuration_gap() {
        let mut rulebook = TaxRulebook::new();
        rulebook.insert_slab_table(
            TaxYear::FY_2024_25,
            Regime::New,
            None,
            flat_table(dec!(0.1)),
        );

        let result = rulebook.slab_table(TaxYear::FY_2025_26, Regime::New, AgeBand::General);

        assert_eq!(
            result,
            Err(ConfigurationGap::SlabTable {
                year: TaxYear::FY_2025_26,
                regime: Regime::New,
                age_band: AgeBand::General,
            })
        );
    }

    #[test]
    fn configuration_gap_message_names_the_key() {
        let gap = ConfigurationGap::RegimeRules {
            year: TaxYear::starting(2023),
            regime: Regime::Old,
        };

        assert_eq!(gap.to_string(), "no old regime rules for 2023-2024");
    }

    // =========================================================================
    // regime rules tests
    // =========================================================================

    #[test]
    fn insert_regime_rules_replaces_existing() {
        let mut rulebook = TaxRulebook::new();
        let year = TaxYear::FY_2025_26;

        let first = rulebook.insert_regime_rules(year, Regime::New, standard_rules());
        let second = rulebook.insert_regime_rules(year, Regime::New, standard_rules());

        assert_eq!(first, Ok(None));
        assert_eq!(second, Ok(Some(standard_rules())));
        assert_eq!(rulebook.regime_rules_count(), 1);
    }

    #[test]
    fn insert_regime_rules_rejects_invalid_rules() {
        let mut rulebook = TaxRulebook::new();
        let mut rules = standard_rules();
        rules.cess_rate = dec!(4);

        let result = rulebook.insert_regime_rules(TaxYear::FY_2025_26, Regime::New, rules);

        assert_eq!(result, Err(RegimeRulesError::InvalidCessRate(dec!(4))));
        assert_eq!(rulebook.regime_rules_count(), 0);
    }

    #[test]
    fn validate_rejects_descending_surcharge_tiers() {
        let mut rules = standard_rules();
        rules.surcharge.reverse();

        assert_eq!(
            rules.validate(),
            Err(RegimeRulesError::SurchargeTiersNotAscending(dec!(5000000)))
        );
    }

    #[test]
    fn validate_rejects_negative_standard_deduction() {
        let mut rules = standard_rules();
        rules.deductions = DeductionPolicy::Standard {
            amount: dec!(-1),
        };

        assert_eq!(
            rules.validate(),
            Err(RegimeRulesError::NegativeDeductionAmount(dec!(-1)))
        );
    }

    #[test]
    fn years_lists_each_year_once() {
        let mut rulebook = TaxRulebook::new();
        for year in [TaxYear::FY_2025_26, TaxYear::FY_2024_25] {
            for regime in Regime::all() {
                rulebook
                    .insert_regime_rules(year, *regime, standard_rules())
                    .unwrap();
            }
        }

        assert_eq!(
            rulebook.years(),
            vec![TaxYear::FY_2024_25, TaxYear::FY_2025_26]
        );
    }

    #[test]
    fn merge_overlays_other_rulebook() {
        let mut base = TaxRulebook::new();
        base.insert_slab_table(
            TaxYear::FY_2024_25,
            Regime::New,
            None,
            flat_table(dec!(0.1)),
        );
        let mut overlay = TaxRulebook::new();
        overlay.insert_slab_table(
            TaxYear::FY_2024_25,
            Regime::New,
            None,
            flat_table(dec!(0.3)),
        );

        base.merge(overlay);

        let table = base
            .slab_table(TaxYear::FY_2024_25, Regime::New, AgeBand::General)
            .unwrap();
        assert_eq!(table.brackets()[0].rate, dec!(0.3));
        assert_eq!(base.slab_table_count(), 1);
    }
}
