mod inputs;
mod outcomes;
mod regime;
mod slab_table;
mod tax_year;

pub use inputs::{DeductionInputs, HraInputs, IncomeProfile, RegimeConfig};
pub use outcomes::{
    BracketAmount, ComparisonResult, DeductionTotals, RebateKind, RegimeOutcome, TaxBreakdown,
};
pub use regime::{AgeBand, Regime};
pub use slab_table::{SlabBracket, SlabTable, SlabTableError};
pub use tax_year::{ParseTaxYearError, TaxYear};
