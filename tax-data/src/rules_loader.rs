use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{DeductionPolicy, Regime, RegimeRules, RegimeRulesError, SurchargeTier, TaxRulebook, TaxYear};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading regime rules.
#[derive(Debug, Error)]
pub enum RegimeRulesLoaderError {
    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid tax year '{0}' (expected e.g. 2025-2026)")]
    InvalidYear(String),

    #[error("Invalid regime '{0}' (expected old or new)")]
    InvalidRegime(String),

    #[error("Rules for the {regime} regime in {year} appear more than once")]
    Duplicate { year: TaxYear, regime: Regime },

    #[error("Invalid rules for the {regime} regime in {year}: {source}")]
    InvalidRules {
        year: TaxYear,
        regime: Regime,
        #[source]
        source: RegimeRulesError,
    },
}

impl From<toml::de::Error> for RegimeRulesLoaderError {
    fn from(err: toml::de::Error) -> Self {
        RegimeRulesLoaderError::TomlParse(err.to_string())
    }
}

/// One `[[regime]]` entry of the rules file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegimeRulesRecord {
    pub year: String,
    pub regime: String,
    pub rebate_threshold: Decimal,
    #[serde(default)]
    pub rebate_marginal_relief: bool,
    pub cess_rate: Decimal,
    #[serde(default)]
    pub surcharge: Vec<SurchargeTier>,
    pub deductions: DeductionPolicy,
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    regime: Vec<RegimeRulesRecord>,
}

impl RegimeRulesRecord {
    fn resolve(&self) -> Result<(TaxYear, Regime, RegimeRules), RegimeRulesLoaderError> {
        let year: TaxYear = self
            .year
            .trim()
            .parse()
            .map_err(|_| RegimeRulesLoaderError::InvalidYear(self.year.clone()))?;
        let regime = Regime::parse(&self.regime)
            .ok_or_else(|| RegimeRulesLoaderError::InvalidRegime(self.regime.clone()))?;

        let rules = RegimeRules {
            rebate_threshold: self.rebate_threshold,
            rebate_marginal_relief: self.rebate_marginal_relief,
            cess_rate: self.cess_rate,
            surcharge: self.surcharge.clone(),
            deductions: self.deductions.clone(),
        };
        rules
            .validate()
            .map_err(|source| RegimeRulesLoaderError::InvalidRules {
                year,
                regime,
                source,
            })?;

        Ok((year, regime, rules))
    }
}

/// Loader for per-regime rules from TOML files.
pub struct RegimeRulesLoader;

impl RegimeRulesLoader {
    /// Parse the `[[regime]]` entries of a rules file.
    pub fn parse(input: &str) -> Result<Vec<RegimeRulesRecord>, RegimeRulesLoaderError> {
        let file: RulesFile = toml::from_str(input)?;
        Ok(file.regime)
    }

    /// Load rule records into `rulebook`, replacing any rules already held
    /// for the same `(year, regime)`.
    ///
    /// Every record is validated before anything is inserted. A file naming
    /// the same `(year, regime)` twice is rejected.
    ///
    /// Returns the number of rule sets loaded.
    pub fn load(
        rulebook: &mut TaxRulebook,
        records: &[RegimeRulesRecord],
    ) -> Result<usize, RegimeRulesLoaderError> {
        let mut resolved: Vec<(TaxYear, Regime, RegimeRules)> = Vec::with_capacity(records.len());

        for record in records {
            let (year, regime, rules) = record.resolve()?;
            if resolved.iter().any(|(y, r, _)| *y == year && *r == regime) {
                return Err(RegimeRulesLoaderError::Duplicate { year, regime });
            }
            resolved.push((year, regime, rules));
        }

        let loaded = resolved.len();
        for (year, regime, rules) in resolved {
            debug!(%year, %regime, "loaded regime rules");
            rulebook
                .insert_regime_rules(year, regime, rules)
                .map_err(|source| RegimeRulesLoaderError::InvalidRules {
                    year,
                    regime,
                    source,
                })?;
        }

        info!(rule_sets = loaded, "regime rules loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const NEW_2025: &str = r#"
[[regime]]
year = "2025-2026"
regime = "new"
rebate_threshold = 1200000
rebate_marginal_relief = true
cess_rate = "0.04"
surcharge = [
    { above = 5000000, rate = "0.10" },
    { above = 10000000, rate = "0.15" },
]
deductions = { kind = "standard", amount = 75000 }
"#;

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_standard_deduction_entry() {
        let records = RegimeRulesLoader::parse(NEW_2025).expect("Failed to parse TOML");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year, "2025-2026");
        assert_eq!(records[0].rebate_threshold, dec!(1200000));
        assert!(records[0].rebate_marginal_relief);
        assert_eq!(records[0].cess_rate, dec!(0.04));
        assert_eq!(
            records[0].surcharge,
            vec![
                SurchargeTier::new(dec!(5000000), dec!(0.10)),
                SurchargeTier::new(dec!(10000000), dec!(0.15)),
            ]
        );
        assert_eq!(
            records[0].deductions,
            DeductionPolicy::Standard {
                amount: dec!(75000)
            }
        );
    }

    #[test]
    fn test_parse_itemized_entry_with_defaults() {
        let input = r#"
[[regime]]
year = "2024-25"
regime = "old"
rebate_threshold = 500000
cess_rate = "0.04"

[regime.deductions]
kind = "itemized"
section_80c = 150000
medical_self = 25000
medical_self_senior = 50000
medical_parents = 25000
medical_parents_senior = 50000
nps_80ccd_1b = 50000
home_loan_interest = 200000
savings_interest = 10000
senior_interest = 50000
standard_deduction = 50000
"#;

        let records = RegimeRulesLoader::parse(input).expect("Failed to parse TOML");

        assert!(!records[0].rebate_marginal_relief);
        assert!(records[0].surcharge.is_empty());
        let DeductionPolicy::Itemized(caps) = &records[0].deductions else {
            panic!("expected itemized deductions, got {:?}", records[0].deductions);
        };
        assert_eq!(caps.section_80c, dec!(150000));
        assert_eq!(caps.senior_interest, dec!(50000));
    }

    #[test]
    fn test_parse_empty_file() {
        let records = RegimeRulesLoader::parse("").expect("Failed to parse TOML");

        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_missing_field() {
        let input = r#"
[[regime]]
year = "2025-2026"
regime = "new"
cess_rate = "0.04"
deductions = { kind = "standard", amount = 75000 }
"#;

        let err = RegimeRulesLoader::parse(input).expect_err("Should fail for missing field");

        let RegimeRulesLoaderError::TomlParse(msg) = err else {
            panic!("Expected TomlParse error, got: {:?}", err);
        };
        assert!(msg.contains("rebate_threshold"), "got: {}", msg);
    }

    #[test]
    fn test_parse_unknown_deduction_kind() {
        let input = NEW_2025.replace("\"standard\"", "\"flat\"");

        let result = RegimeRulesLoader::parse(&input);

        assert!(matches!(result, Err(RegimeRulesLoaderError::TomlParse(_))));
    }

    // =========================================================================
    // load tests
    // =========================================================================

    #[test]
    fn test_load_into_rulebook() {
        let records = RegimeRulesLoader::parse(NEW_2025).unwrap();
        let mut rulebook = TaxRulebook::new();

        let loaded = RegimeRulesLoader::load(&mut rulebook, &records).unwrap();

        assert_eq!(loaded, 1);
        let rules = rulebook.regime_rules(TaxYear::FY_2025_26, Regime::New).unwrap();
        assert_eq!(rules.rebate_threshold, dec!(1200000));
        assert_eq!(rulebook.years(), vec![TaxYear::FY_2025_26]);
    }

    #[test]
    fn test_load_replaces_existing_rules() {
        let mut rulebook = TaxRulebook::builtin();
        let raised = NEW_2025.replace("1200000", "1300000");
        let records = RegimeRulesLoader::parse(&raised).unwrap();

        RegimeRulesLoader::load(&mut rulebook, &records).unwrap();

        let rules = rulebook.regime_rules(TaxYear::FY_2025_26, Regime::New).unwrap();
        assert_eq!(rules.rebate_threshold, dec!(1300000));
        assert_eq!(rulebook.regime_rules_count(), 4);
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let input = format!("{NEW_2025}\n{NEW_2025}");
        let records = RegimeRulesLoader::parse(&input).unwrap();
        let mut rulebook = TaxRulebook::new();

        let result = RegimeRulesLoader::load(&mut rulebook, &records);

        match result {
            Err(RegimeRulesLoaderError::Duplicate { year, regime }) => {
                assert_eq!(year, TaxYear::FY_2025_26);
                assert_eq!(regime, Regime::New);
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
        assert_eq!(rulebook.regime_rules_count(), 0);
    }

    #[test]
    fn test_load_rejects_descending_surcharge_tiers() {
        let input = NEW_2025.replace("above = 10000000", "above = 4000000");
        let records = RegimeRulesLoader::parse(&input).unwrap();

        let result = RegimeRulesLoader::load(&mut TaxRulebook::new(), &records);

        match result {
            Err(RegimeRulesLoaderError::InvalidRules { source, .. }) => {
                assert_eq!(
                    source,
                    RegimeRulesError::SurchargeTiersNotAscending(dec!(4000000))
                );
            }
            other => panic!("expected InvalidRules, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_bad_cess_rate() {
        let input = NEW_2025.replace("cess_rate = \"0.04\"", "cess_rate = \"4\"");
        let records = RegimeRulesLoader::parse(&input).unwrap();

        let result = RegimeRulesLoader::load(&mut TaxRulebook::new(), &records);

        assert!(matches!(
            result,
            Err(RegimeRulesLoaderError::InvalidRules {
                source: RegimeRulesError::InvalidCessRate(_),
                ..
            })
        ));
    }

    #[test]
    fn test_load_rejects_invalid_regime() {
        let input = NEW_2025.replace("regime = \"new\"", "regime = \"flat\"");
        let records = RegimeRulesLoader::parse(&input).unwrap();

        let result = RegimeRulesLoader::load(&mut TaxRulebook::new(), &records);

        match result {
            Err(RegimeRulesLoaderError::InvalidRegime(ref regime)) => assert_eq!(regime, "flat"),
            other => panic!("expected InvalidRegime, got {other:?}"),
        }
    }
}
