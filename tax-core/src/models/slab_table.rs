use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a list of brackets does not form a valid slab table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlabTableError {
    #[error("slab table has no brackets")]
    Empty,

    #[error("first bracket must start at 0, got {0}")]
    DoesNotStartAtZero(Decimal),

    #[error("bracket starting at {found} does not continue from the previous upper bound {expected}")]
    NotContiguous { expected: Decimal, found: Decimal },

    #[error("bracket [{lower}, {upper}] is empty or inverted")]
    EmptyBracket { lower: Decimal, upper: Decimal },

    #[error("only the last bracket may be unbounded (bracket starting at {0} is not last)")]
    UnboundedBeforeEnd(Decimal),

    #[error("last bracket must be unbounded, but ends at {0}")]
    BoundedLastBracket(Decimal),

    #[error("rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),
}

/// One progressive bracket: income in `(lower_bound, upper_bound]` is taxed
/// at `rate`. `upper_bound` of `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabBracket {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl SlabBracket {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Portion of `income` that falls inside this bracket.
    pub fn taxable_portion(
        &self,
        income: Decimal,
    ) -> Decimal {
        if income <= self.lower_bound {
            return Decimal::ZERO;
        }
        let top = match self.upper_bound {
            Some(upper) => income.min(upper),
            None => income,
        };
        top - self.lower_bound
    }
}

/// An ordered, gapless sequence of brackets covering `[0, ∞)`.
///
/// The invariants are checked once in [`SlabTable::new`], so a constructed
/// table can be walked without further validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SlabBracket>", into = "Vec<SlabBracket>")]
pub struct SlabTable {
    brackets: Vec<SlabBracket>,
}

impl SlabTable {
    /// Builds a table, validating that the brackets start at zero, are
    /// contiguous and ascending, end unbounded and carry rates in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SlabTableError`] found while walking the brackets.
    pub fn new(brackets: Vec<SlabBracket>) -> Result<Self, SlabTableError> {
        let first = brackets.first().ok_or(SlabTableError::Empty)?;
        if first.lower_bound != Decimal::ZERO {
            return Err(SlabTableError::DoesNotStartAtZero(first.lower_bound));
        }

        let last_index = brackets.len() - 1;
        let mut expected_lower = Decimal::ZERO;

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.lower_bound != expected_lower {
                return Err(SlabTableError::NotContiguous {
                    expected: expected_lower,
                    found: bracket.lower_bound,
                });
            }
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(SlabTableError::InvalidRate(bracket.rate));
            }

            match bracket.upper_bound {
                Some(upper) if upper <= bracket.lower_bound => {
                    return Err(SlabTableError::EmptyBracket {
                        lower: bracket.lower_bound,
                        upper,
                    });
                }
                Some(upper) if index == last_index => {
                    return Err(SlabTableError::BoundedLastBracket(upper));
                }
                Some(upper) => expected_lower = upper,
                None if index != last_index => {
                    return Err(SlabTableError::UnboundedBeforeEnd(bracket.lower_bound));
                }
                None => {}
            }
        }

        Ok(Self { brackets })
    }

    /// Builds a table from brackets already known to be valid, such as the
    /// built-in rulebook's literals.
    pub(crate) fn new_unchecked(brackets: Vec<SlabBracket>) -> Self {
        debug_assert!(Self::new(brackets.clone()).is_ok());
        Self { brackets }
    }

    pub fn brackets(&self) -> &[SlabBracket] {
        &self.brackets
    }

    /// Marginal rate applying to the next rupee above `income`.
    pub fn marginal_rate(
        &self,
        income: Decimal,
    ) -> Decimal {
        self.brackets
            .iter()
            .find(|b| b.upper_bound.is_none_or(|upper| income < upper))
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }
}

impl TryFrom<Vec<SlabBracket>> for SlabTable {
    type Error = SlabTableError;

    fn try_from(brackets: Vec<SlabBracket>) -> Result<Self, Self::Error> {
        Self::new(brackets)
    }
}

impl From<SlabTable> for Vec<SlabBracket> {
    fn from(table: SlabTable) -> Self {
        table.brackets
    }
}
