use std::fmt;

use serde::{Deserialize, Serialize};

/// The two mutually exclusive tax-computation policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Regime {
    /// Itemized deductions, age-dependent slabs.
    Old,
    /// Flat standard deduction, one slab table per fiscal year.
    New,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Some(Self::Old),
            "new" => Some(Self::New),
            _ => None,
        }
    }

    pub fn all() -> &'static [Regime] {
        &[Self::Old, Self::New]
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxpayer age band. Drives the old-regime slab thresholds and the
/// self-and-family §80D cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgeBand {
    /// Below 60.
    #[default]
    General,
    /// 60 to 79.
    Senior,
    /// 80 and above.
    SuperSenior,
}

impl AgeBand {
    /// Band for a taxpayer of the given age in years.
    pub fn for_age(age: u32) -> Self {
        match age {
            0..60 => Self::General,
            60..80 => Self::Senior,
            _ => Self::SuperSenior,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Senior => "senior",
            Self::SuperSenior => "superSenior",
        }
    }

    /// Accepts `general`, `senior` and the `superSenior` / `super-senior` /
    /// `super_senior` spellings, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "general" => Some(Self::General),
            "senior" => Some(Self::Senior),
            "supersenior" => Some(Self::SuperSenior),
            _ => None,
        }
    }

    pub fn all() -> &'static [AgeBand] {
        &[Self::General, Self::Senior, Self::SuperSenior]
    }

    pub fn is_senior(&self) -> bool {
        !matches!(self, Self::General)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn regime_parse_round_trips_as_str() {
        for regime in Regime::all() {
            assert_eq!(Regime::parse(regime.as_str()), Some(*regime));
        }
        assert_eq!(Regime::parse(" NEW "), Some(Regime::New));
        assert_eq!(Regime::parse("both"), None);
    }

    #[test]
    fn age_band_accepts_super_senior_spellings() {
        for s in ["superSenior", "super-senior", "super_senior", "SUPERSENIOR"] {
            assert_eq!(AgeBand::parse(s), Some(AgeBand::SuperSenior), "{s}");
        }
        assert_eq!(AgeBand::parse("junior"), None);
    }

    #[test]
    fn age_band_for_age_boundaries() {
        assert_eq!(AgeBand::for_age(59), AgeBand::General);
        assert_eq!(AgeBand::for_age(60), AgeBand::Senior);
        assert_eq!(AgeBand::for_age(79), AgeBand::Senior);
        assert_eq!(AgeBand::for_age(80), AgeBand::SuperSenior);
    }
}
