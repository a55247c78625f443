use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a recognisable fiscal year.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid fiscal year '{input}' (expected e.g. \"2025-2026\" or \"2025-26\")")]
pub struct ParseTaxYearError {
    input: String,
}

/// A fiscal year, identified by the calendar year it starts in.
///
/// Displayed and parsed as `"2025-2026"`; the short form `"2025-26"` is also
/// accepted. The year is only a lookup key into a
/// [`TaxRulebook`](crate::rules::TaxRulebook), so any year can be named here
/// and a missing one surfaces as a configuration gap at lookup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxYear {
    start: u16,
}

impl TaxYear {
    /// Fiscal year 2024-25 (1 April 2024 to 31 March 2025).
    pub const FY_2024_25: Self = Self::starting(2024);

    /// Fiscal year 2025-26 (1 April 2025 to 31 March 2026).
    pub const FY_2025_26: Self = Self::starting(2025);

    pub const fn starting(start: u16) -> Self {
        Self { start }
    }

    pub fn start_year(&self) -> u16 {
        self.start
    }

    /// Widened so the year after `u16::MAX` is still representable.
    pub fn end_year(&self) -> u32 {
        u32::from(self.start) + 1
    }
}

impl fmt::Display for TaxYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end_year())
    }
}

impl FromStr for TaxYear {
    type Err = ParseTaxYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTaxYearError {
            input: s.to_string(),
        };

        let (start, end) = s.trim().split_once('-').ok_or_else(err)?;
        let start: u16 = start.trim().parse().map_err(|_| err())?;
        let end = end.trim();
        let end_value: u16 = end.parse().map_err(|_| err())?;

        let expected = match end.len() {
            4 => start.checked_add(1),
            2 => start.checked_add(1).map(|y| y % 100),
            _ => None,
        };

        if expected == Some(end_value) {
            Ok(Self::starting(start))
        } else {
            Err(err())
        }
    }
}

impl TryFrom<String> for TaxYear {
    type Error = ParseTaxYearError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxYear> for String {
    fn from(year: TaxYear) -> Self {
        year.to_string()
    }
}
