use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{AgeBand, Regime, SlabBracket, SlabTable, SlabTableError, TaxRulebook, TaxYear};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading slab table data.
#[derive(Debug, Error)]
pub enum SlabTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid tax year '{0}' (expected e.g. 2025-2026)")]
    InvalidYear(String),

    #[error("Invalid regime '{0}' (expected old or new)")]
    InvalidRegime(String),

    #[error("Invalid age band '{0}' (expected general, senior, superSenior or all)")]
    InvalidAgeBand(String),

    #[error("Invalid slab table for the {regime} regime in {year} ({age_band}): {source}")]
    InvalidTable {
        year: TaxYear,
        regime: Regime,
        age_band: String,
        #[source]
        source: SlabTableError,
    },
}

impl From<csv::Error> for SlabTableLoaderError {
    fn from(err: csv::Error) -> Self {
        SlabTableLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the slab tables CSV file.
///
/// - `tax_year`: fiscal year, e.g. `2025-2026` or `2025-26`
/// - `regime`: `old` or `new`
/// - `age_band`: `general`, `senior`, `superSenior`; empty or `all` for a
///   table shared by every age band
/// - `lower_bound`: where the bracket starts
/// - `upper_bound`: where it ends (empty for the unbounded top bracket)
/// - `rate`: marginal rate as a fraction (e.g. 0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlabTableRecord {
    pub tax_year: String,
    pub regime: String,
    #[serde(default)]
    pub age_band: Option<String>,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

type GroupKey = (TaxYear, Regime, Option<AgeBand>);

fn parse_year(s: &str) -> Result<TaxYear, SlabTableLoaderError> {
    s.trim()
        .parse()
        .map_err(|_| SlabTableLoaderError::InvalidYear(s.to_string()))
}

fn parse_regime(s: &str) -> Result<Regime, SlabTableLoaderError> {
    Regime::parse(s).ok_or_else(|| SlabTableLoaderError::InvalidRegime(s.to_string()))
}

/// `None` stands for "every age band".
fn parse_age_band(s: Option<&str>) -> Result<Option<AgeBand>, SlabTableLoaderError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => AgeBand::parse(s)
            .map(Some)
            .ok_or_else(|| SlabTableLoaderError::InvalidAgeBand(s.to_string())),
    }
}

fn age_band_label(age_band: Option<AgeBand>) -> String {
    age_band.map_or_else(|| "all age bands".to_string(), |band| band.to_string())
}

/// Loader for slab tables from CSV files.
pub struct SlabTableLoader;

impl SlabTableLoader {
    /// Parse slab records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<SlabTableRecord>, SlabTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SlabTableRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load slab records into `rulebook`.
    ///
    /// Records are grouped by `(tax_year, regime, age_band)` and each group
    /// replaces whatever table the rulebook held for that key, so loading the
    /// same file twice gives the same rulebook. Every group is validated
    /// before anything is inserted; on error the rulebook is untouched.
    ///
    /// Returns the number of tables loaded.
    pub fn load(
        rulebook: &mut TaxRulebook,
        records: &[SlabTableRecord],
    ) -> Result<usize, SlabTableLoaderError> {
        let mut groups: BTreeMap<GroupKey, Vec<SlabBracket>> = BTreeMap::new();

        for record in records {
            let key = (
                parse_year(&record.tax_year)?,
                parse_regime(&record.regime)?,
                parse_age_band(record.age_band.as_deref())?,
            );
            groups.entry(key).or_default().push(SlabBracket::new(
                record.lower_bound,
                record.upper_bound,
                record.rate,
            ));
        }

        let mut tables = Vec::with_capacity(groups.len());
        for ((year, regime, age_band), mut brackets) in groups {
            brackets.sort_by(|a, b| a.lower_bound.cmp(&b.lower_bound));
            let table = SlabTable::new(brackets).map_err(|source| {
                SlabTableLoaderError::InvalidTable {
                    year,
                    regime,
                    age_band: age_band_label(age_band),
                    source,
                }
            })?;
            tables.push((year, regime, age_band, table));
        }

        let loaded = tables.len();
        for (year, regime, age_band, table) in tables {
            debug!(
                %year,
                %regime,
                age_band = %age_band_label(age_band),
                brackets = table.brackets().len(),
                "loaded slab table"
            );
            rulebook.insert_slab_table(year, regime, age_band, table);
        }

        info!(tables = loaded, "slab tables loaded");
        Ok(loaded)
    }
}
