//! CSV loader for batch comparison scenarios.
//!
//! ## CSV Format
//!
//! One taxpayer profile per row. Column order does **not** matter (headers
//! are matched by name). Only `gross_salary` is required; every other
//! column may be left out or left empty.
//!
//! | Column               | Type    | Notes |
//! |----------------------|---------|-------|
//! | `name`               | string  | Defaults to `row N` |
//! | `year`               | string  | e.g. `2025-2026`; defaults to `--year` |
//! | `age_band`           | string  | `general`, `senior`, `superSenior` |
//! | `age`                | integer | Used when `age_band` is empty |
//! | `gross_salary`       | amount  | |
//! | `other_income`       | amount  | |
//! | `interest_income`    | amount  | Savings / deposit interest |
//! | `section_80c`        | amount  | |
//! | `medical_self`       | amount  | §80D self and family |
//! | `medical_parents`    | amount  | §80D parents |
//! | `parents_senior`     | yes/no  | |
//! | `nps_80ccd_1b`       | amount  | |
//! | `hra_exemption`      | amount  | Takes precedence over the HRA columns below |
//! | `home_loan_interest` | amount  | |
//! | `professional_tax`   | amount  | |
//! | `other_deductions`   | amount  | |
//! | `basic_salary`       | amount  | HRA calculator input |
//! | `hra_received`       | amount  | HRA calculator input |
//! | `rent_paid`          | amount  | Annual rent; HRA calculator input |
//! | `metro`              | yes/no  | HRA calculator input |
//!
//! Amounts are read like command-line amounts: `12,00,000`, `₹50,000` and
//! `Rs 1500` are accepted, and unreadable or negative values count as 0.
//!
//! ### Example
//!
//! ```csv
//! name,gross_salary,section_80c,basic_salary,hra_received,rent_paid,metro
//! Asha,1800000,150000,720000,360000,300000,yes
//! Ravi,1200000,,,,,
//! ```

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::calculations::hra_exemption;
use tax_core::{AgeBand, DeductionInputs, HraInputs, IncomeProfile, RegimeConfig, TaxYear};

use crate::utils::{parse_amount, parse_flag};

#[derive(Debug, Deserialize)]
struct CsvRow {
    name: Option<String>,
    year: Option<String>,
    age_band: Option<String>,
    age: Option<u32>,
    gross_salary: String,
    other_income: Option<String>,
    interest_income: Option<String>,
    section_80c: Option<String>,
    medical_self: Option<String>,
    medical_parents: Option<String>,
    parents_senior: Option<String>,
    nps_80ccd_1b: Option<String>,
    hra_exemption: Option<String>,
    home_loan_interest: Option<String>,
    professional_tax: Option<String>,
    other_deductions: Option<String>,
    basic_salary: Option<String>,
    hra_received: Option<String>,
    rent_paid: Option<String>,
    metro: Option<String>,
}

/// One row of a scenarios file, ready for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub income: IncomeProfile,
    pub deductions: DeductionInputs,
    pub config: RegimeConfig,
}

/// Errors that can occur while loading scenarios.
///
/// Row numbers are 1-based and count data rows only (header = row 0).
#[derive(Debug, thiserror::Error)]
pub enum ScenarioLoadError {
    #[error("cannot read scenarios file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, missing `gross_salary` column, non-numeric `age`...
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("invalid year '{value}' on row {row}")]
    InvalidYear { value: String, row: usize },

    #[error("unrecognised age band '{value}' on row {row}")]
    InvalidAgeBand { value: String, row: usize },

    #[error("column '{column}' on row {row} must be yes or no, got '{value}'")]
    InvalidFlag {
        column: &'static str,
        value: String,
        row: usize,
    },
}

fn amount(cell: &Option<String>) -> Decimal {
    cell.as_deref().map(parse_amount).unwrap_or(Decimal::ZERO)
}

fn flag(
    cell: &Option<String>,
    column: &'static str,
    row: usize,
) -> Result<bool, ScenarioLoadError> {
    let value = cell.as_deref().unwrap_or("");
    parse_flag(value).ok_or_else(|| ScenarioLoadError::InvalidFlag {
        column,
        value: value.to_string(),
        row,
    })
}

fn is_blank(cell: &Option<String>) -> bool {
    cell.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
    defaults: RegimeConfig,
) -> Result<Scenario, ScenarioLoadError> {
    let year = match row.year.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(value) => value
            .parse::<TaxYear>()
            .map_err(|_| ScenarioLoadError::InvalidYear {
                value: value.to_string(),
                row: row_number,
            })?,
        None => defaults.year,
    };

    let age_band = match (row.age_band.as_deref().filter(|s| !s.trim().is_empty()), row.age) {
        (Some(value), _) => {
            AgeBand::parse(value).ok_or_else(|| ScenarioLoadError::InvalidAgeBand {
                value: value.to_string(),
                row: row_number,
            })?
        }
        (None, Some(age)) => AgeBand::for_age(age),
        (None, None) => defaults.age_band,
    };

    let hra = if is_blank(&row.hra_exemption) {
        hra_exemption(&HraInputs {
            basic_salary: amount(&row.basic_salary),
            hra_received: amount(&row.hra_received),
            rent_paid_annual: amount(&row.rent_paid),
            is_metro: flag(&row.metro, "metro", row_number)?,
        })
    } else {
        amount(&row.hra_exemption)
    };

    Ok(Scenario {
        name: row
            .name
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("row {row_number}")),
        income: IncomeProfile {
            gross_salary: parse_amount(&row.gross_salary),
            other_income: amount(&row.other_income),
            interest_income: amount(&row.interest_income),
        },
        deductions: DeductionInputs {
            section_80c: amount(&row.section_80c),
            medical_self: amount(&row.medical_self),
            medical_parents: amount(&row.medical_parents),
            parents_senior: flag(&row.parents_senior, "parents_senior", row_number)?,
            nps_80ccd_1b: amount(&row.nps_80ccd_1b),
            hra_exemption: hra,
            home_loan_interest: amount(&row.home_loan_interest),
            professional_tax: amount(&row.professional_tax),
            other_deductions: amount(&row.other_deductions),
        },
        config: RegimeConfig::new(year, age_band),
    })
}

/// Parse CSV text and return the scenarios in file order. `defaults` fills
/// rows that leave `year` or the age columns empty.
///
/// # Errors
///
/// * [`ScenarioLoadError::Parse`] if the CSV is structurally invalid.
/// * [`ScenarioLoadError::InvalidYear`], [`ScenarioLoadError::InvalidAgeBand`]
///   or [`ScenarioLoadError::InvalidFlag`] for the first bad cell.
pub fn load_from_str(
    input: &str,
    defaults: RegimeConfig,
) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1, defaults))
        .collect()
}

/// Reads `path` and delegates to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    defaults: RegimeConfig,
) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScenarioLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents, defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn defaults() -> RegimeConfig {
        RegimeConfig::new(TaxYear::FY_2025_26, AgeBand::General)
    }

    // -----------------------------------------------------------------------
    // Required column only
    // -----------------------------------------------------------------------
    #[test]
    fn test_minimal_csv_uses_defaults() {
        let scenarios = load_from_str("gross_salary\n1200000\n", defaults()).unwrap();

        assert_eq!(
            scenarios,
            vec![Scenario {
                name: "row 1".to_string(),
                income: IncomeProfile::salaried(dec!(1200000)),
                deductions: DeductionInputs::default(),
                config: defaults(),
            }]
        );
    }

    #[test]
    fn test_header_only_is_empty() {
        let scenarios = load_from_str("name,gross_salary\n", defaults()).unwrap();

        assert!(scenarios.is_empty());
    }

    // -----------------------------------------------------------------------
    // Amount coercion
    // -----------------------------------------------------------------------
    #[test]
    fn test_amounts_are_read_permissively() {
        let csv = "\
name,gross_salary,section_80c,home_loan_interest,other_income
Asha,\"12,00,000\",₹ten,-20000,Rs 5000
";
        let scenarios = load_from_str(csv, defaults()).unwrap();
        let s = &scenarios[0];

        assert_eq!(s.income.gross_salary, dec!(1200000));
        assert_eq!(s.income.other_income, dec!(5000));
        // Unreadable and negative cells become 0.
        assert_eq!(s.deductions.section_80c, dec!(0));
        assert_eq!(s.deductions.home_loan_interest, dec!(0));
    }

    // -----------------------------------------------------------------------
    // Year and age band
    // -----------------------------------------------------------------------
    #[test]
    fn test_year_and_age_band_per_row() {
        let csv = "\
gross_salary,year,age_band,age
900000,2024-25,senior,
900000,,,82
900000,,superSenior,30
";
        let scenarios = load_from_str(csv, defaults()).unwrap();

        assert_eq!(
            scenarios[0].config,
            RegimeConfig::new(TaxYear::FY_2024_25, AgeBand::Senior)
        );
        assert_eq!(
            scenarios[1].config,
            RegimeConfig::new(TaxYear::FY_2025_26, AgeBand::SuperSenior)
        );
        // An explicit band wins over the age.
        assert_eq!(scenarios[2].config.age_band, AgeBand::SuperSenior);
    }

    #[test]
    fn test_invalid_year_reports_row() {
        let csv = "gross_salary,year\n1,2025-2026\n1,2025\n";

        match load_from_str(csv, defaults()).unwrap_err() {
            ScenarioLoadError::InvalidYear { value, row } => {
                assert_eq!(value, "2025");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidYear, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_age_band_reports_row() {
        let csv = "gross_salary,age_band\n1,teen\n";

        match load_from_str(csv, defaults()).unwrap_err() {
            ScenarioLoadError::InvalidAgeBand { value, row } => {
                assert_eq!(value, "teen");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidAgeBand, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // HRA
    // -----------------------------------------------------------------------
    #[test]
    fn test_hra_computed_from_calculator_columns() {
        let csv = "\
gross_salary,basic_salary,hra_received,rent_paid,metro
1500000,600000,300000,240000,yes
";
        let scenarios = load_from_str(csv, defaults()).unwrap();

        assert_eq!(scenarios[0].deductions.hra_exemption, dec!(180000));
    }

    #[test]
    fn test_explicit_hra_exemption_wins() {
        let csv = "\
gross_salary,hra_exemption,basic_salary,hra_received,rent_paid,metro
1500000,50000,600000,300000,240000,yes
";
        let scenarios = load_from_str(csv, defaults()).unwrap();

        assert_eq!(scenarios[0].deductions.hra_exemption, dec!(50000));
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let csv = "gross_salary,parents_senior\n1,perhaps\n";

        match load_from_str(csv, defaults()).unwrap_err() {
            ScenarioLoadError::InvalidFlag { column, value, row } => {
                assert_eq!(column, "parents_senior");
                assert_eq!(value, "perhaps");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidFlag, got {:?}", other),
        }
    }

    // -----------------------------------------------------------------------
    // Structural errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_missing_gross_salary_column_is_parse_error() {
        let result = load_from_str("name,section_80c\nAsha,150000\n", defaults());

        assert!(matches!(result, Err(ScenarioLoadError::Parse(_))));
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let csv = "section_80c,name,gross_salary\n150000,Ravi,1000000\n";
        let scenarios = load_from_str(csv, defaults()).unwrap();

        assert_eq!(scenarios[0].name, "Ravi");
        assert_eq!(scenarios[0].deductions.section_80c, dec!(150000));
        assert_eq!(scenarios[0].income.gross_salary, dec!(1000000));
    }
}
