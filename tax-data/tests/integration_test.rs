//! Integration tests for loading the shipped data files into a rulebook.

use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tax_core::{
    AgeBand, DeductionInputs, IncomeProfile, Regime, RegimeConfig, TaxRulebook, TaxYear,
    calculations::RegimeComparator,
};
use tax_data::{
    BUILTIN_REGIME_RULES_TOML, BUILTIN_SLAB_TABLES_CSV, RegimeRulesLoader, SlabTableLoader,
    SlabTableLoaderError,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_shipped_data() -> TaxRulebook {
    let mut rulebook = TaxRulebook::new();

    let slabs = SlabTableLoader::parse(BUILTIN_SLAB_TABLES_CSV.as_bytes())
        .expect("Failed to parse shipped slab tables");
    SlabTableLoader::load(&mut rulebook, &slabs).expect("Failed to load shipped slab tables");

    let rules = RegimeRulesLoader::parse(BUILTIN_REGIME_RULES_TOML)
        .expect("Failed to parse shipped regime rules");
    RegimeRulesLoader::load(&mut rulebook, &rules).expect("Failed to load shipped regime rules");

    rulebook
}

#[test]
fn test_shipped_data_reproduces_builtin_rulebook() {
    let rulebook = load_shipped_data();

    assert_eq!(rulebook, TaxRulebook::builtin());
}

#[test]
fn test_shipped_data_counts() {
    let rulebook = load_shipped_data();

    // Three old-regime age bands plus one shared new-regime table, per year.
    assert_eq!(rulebook.slab_table_count(), 8);
    assert_eq!(rulebook.regime_rules_count(), 4);
    assert_eq!(rulebook.years(), vec![TaxYear::FY_2024_25, TaxYear::FY_2025_26]);
}

#[test]
fn test_loading_shipped_data_twice_is_idempotent() {
    let mut rulebook = load_shipped_data();

    let slabs = SlabTableLoader::parse(BUILTIN_SLAB_TABLES_CSV.as_bytes()).unwrap();
    SlabTableLoader::load(&mut rulebook, &slabs).unwrap();
    let rules = RegimeRulesLoader::parse(BUILTIN_REGIME_RULES_TOML).unwrap();
    RegimeRulesLoader::load(&mut rulebook, &rules).unwrap();

    assert_eq!(rulebook, TaxRulebook::builtin());
}

#[test]
fn test_overlay_adds_a_fiscal_year() {
    let mut rulebook = TaxRulebook::builtin();
    let slabs = fs::read_to_string(fixture("fy2026_slabs.csv")).expect("Failed to read fixture");
    let rules = fs::read_to_string(fixture("fy2026_rules.toml")).expect("Failed to read fixture");

    let records = SlabTableLoader::parse(slabs.as_bytes()).unwrap();
    SlabTableLoader::load(&mut rulebook, &records).unwrap();
    let records = RegimeRulesLoader::parse(&rules).unwrap();
    RegimeRulesLoader::load(&mut rulebook, &records).unwrap();

    let year = TaxYear::starting(2026);
    let config = RegimeConfig::new(year, AgeBand::Senior);
    let result = RegimeComparator::new(&rulebook)
        .compare(
            &IncomeProfile::salaried(dec!(1275000)),
            &DeductionInputs::default(),
            &config,
        )
        .expect("2026-2027 should be fully covered");

    assert_eq!(result.new.taxable_income, dec!(1200000));
    assert_eq!(result.new.total_tax(), dec!(0));
    // Existing years are untouched.
    assert_eq!(
        rulebook.regime_rules(TaxYear::FY_2025_26, Regime::New),
        TaxRulebook::builtin_ref().regime_rules(TaxYear::FY_2025_26, Regime::New)
    );
}

#[test]
fn test_invalid_fixture_is_rejected() {
    let slabs = fs::read_to_string(fixture("overlapping_slabs.csv")).expect("Failed to read fixture");
    let records = SlabTableLoader::parse(slabs.as_bytes()).unwrap();
    let mut rulebook = TaxRulebook::builtin();

    let result = SlabTableLoader::load(&mut rulebook, &records);

    assert!(matches!(result, Err(SlabTableLoaderError::InvalidTable { .. })));
    assert_eq!(rulebook, TaxRulebook::builtin());
}
