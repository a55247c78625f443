//! Tax calculation stages for the old and new regimes.
//!
//! Each stage is a small calculator over data resolved from a
//! [`TaxRulebook`](crate::rules::TaxRulebook); [`RegimeComparator`] chains
//! them into the full per-regime pipeline.

pub mod common;

mod cache;
mod cess;
mod comparator;
mod deductions;
mod hra;
mod rebate;
mod slab;
mod surcharge;

pub use cache::CachedComparator;
pub use cess::cess;
pub use comparator::{RegimeComparator, compare};
pub use deductions::{DeductionAggregator, taxable_income};
pub use hra::hra_exemption;
pub use rebate::{RebateEngine, RebateOutcome};
pub use slab::{SlabTaxCalculator, SlabTaxResult};
pub use surcharge::{SurchargeCalculator, SurchargeOutcome};
