//! Built-in rules for fiscal years 2024-25 and 2025-26.
//!
//! The same figures ship as data files in the `tax-data` crate
//! (`data/slab_tables.csv`, `data/regime_rules.toml`); the two sources are
//! checked against each other in that crate's integration tests.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{DeductionPolicy, ItemizedCaps, RegimeRules, SurchargeTier, TaxRulebook};
use crate::models::{AgeBand, Regime, SlabBracket, SlabTable, TaxYear};

static BUILTIN: LazyLock<TaxRulebook> = LazyLock::new(build);

impl TaxRulebook {
    /// Rules for fiscal years 2024-25 and 2025-26.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Shared instance of [`TaxRulebook::builtin`].
    pub fn builtin_ref() -> &'static TaxRulebook {
        &BUILTIN
    }
}

/// Builds a table from the upper bounds of every bracket but the last and
/// one rate per bracket.
fn progressive(
    bounds: &[Decimal],
    rates: &[Decimal],
) -> SlabTable {
    debug_assert_eq!(bounds.len() + 1, rates.len());

    let mut lower = Decimal::ZERO;
    let mut brackets = Vec::with_capacity(rates.len());
    for (index, rate) in rates.iter().enumerate() {
        let upper = bounds.get(index).copied();
        brackets.push(SlabBracket::new(lower, upper, *rate));
        if let Some(upper) = upper {
            lower = upper;
        }
    }

    SlabTable::new_unchecked(brackets)
}

fn old_regime_tables() -> [(AgeBand, SlabTable); 3] {
    [
        (
            AgeBand::General,
            progressive(
                &[dec!(250000), dec!(500000), dec!(1000000)],
                &[dec!(0), dec!(0.05), dec!(0.20), dec!(0.30)],
            ),
        ),
        (
            AgeBand::Senior,
            progressive(
                &[dec!(300000), dec!(500000), dec!(1000000)],
                &[dec!(0), dec!(0.05), dec!(0.20), dec!(0.30)],
            ),
        ),
        (
            AgeBand::SuperSenior,
            progressive(
                &[dec!(500000), dec!(1000000)],
                &[dec!(0), dec!(0.20), dec!(0.30)],
            ),
        ),
    ]
}

fn new_regime_table(year: TaxYear) -> SlabTable {
    if year >= TaxYear::FY_2025_26 {
        progressive(
            &[
                dec!(400000),
                dec!(800000),
                dec!(1200000),
                dec!(1600000),
                dec!(2000000),
                dec!(2400000),
            ],
            &[
                dec!(0),
                dec!(0.05),
                dec!(0.10),
                dec!(0.15),
                dec!(0.20),
                dec!(0.25),
                dec!(0.30),
            ],
        )
    } else {
        progressive(
            &[
                dec!(300000),
                dec!(700000),
                dec!(1000000),
                dec!(1200000),
                dec!(1500000),
            ],
            &[
                dec!(0),
                dec!(0.05),
                dec!(0.10),
                dec!(0.15),
                dec!(0.20),
                dec!(0.30),
            ],
        )
    }
}

fn surcharge_tiers(regime: Regime) -> Vec<SurchargeTier> {
    let mut tiers = vec![
        SurchargeTier::new(dec!(5000000), dec!(0.10)),
        SurchargeTier::new(dec!(10000000), dec!(0.15)),
        SurchargeTier::new(dec!(20000000), dec!(0.25)),
    ];
    // The new regime caps the surcharge at 25%.
    if regime == Regime::Old {
        tiers.push(SurchargeTier::new(dec!(50000000), dec!(0.37)));
    }
    tiers
}

fn old_regime_rules() -> RegimeRules {
    RegimeRules {
        rebate_threshold: dec!(500000),
        rebate_marginal_relief: false,
        cess_rate: dec!(0.04),
        surcharge: surcharge_tiers(Regime::Old),
        deductions: DeductionPolicy::Itemized(ItemizedCaps {
            section_80c: dec!(150000),
            medical_self: dec!(25000),
            medical_self_senior: dec!(50000),
            medical_parents: dec!(25000),
            medical_parents_senior: dec!(50000),
            nps_80ccd_1b: dec!(50000),
            home_loan_interest: dec!(200000),
            savings_interest: dec!(10000),
            senior_interest: dec!(50000),
            standard_deduction: dec!(50000),
        }),
    }
}

fn new_regime_rules(year: TaxYear) -> RegimeRules {
    let rebate_threshold = if year >= TaxYear::FY_2025_26 {
        dec!(1200000)
    } else {
        dec!(700000)
    };

    RegimeRules {
        rebate_threshold,
        rebate_marginal_relief: true,
        cess_rate: dec!(0.04),
        surcharge: surcharge_tiers(Regime::New),
        deductions: DeductionPolicy::Standard {
            amount: dec!(75000),
        },
    }
}

fn build() -> TaxRulebook {
    let mut slab_tables = BTreeMap::new();
    let mut regime_rules = BTreeMap::new();

    for year in [TaxYear::FY_2024_25, TaxYear::FY_2025_26] {
        for (age_band, table) in old_regime_tables() {
            slab_tables.insert((year, Regime::Old, Some(age_band)), table);
        }
        slab_tables.insert((year, Regime::New, None), new_regime_table(year));

        regime_rules.insert((year, Regime::Old), old_regime_rules());
        regime_rules.insert((year, Regime::New), new_regime_rules(year));
    }

    TaxRulebook {
        slab_tables,
        regime_rules,
    }
}
