//! Progressive slab tax.
//!
//! Brackets are walked in ascending order. Every bracket whose lower bound
//! is below the taxable income contributes
//! `rate × (min(income, upper) − lower)`; the walk stops at the first bracket
//! the income does not reach.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::SlabTaxCalculator;
//! use tax_core::{AgeBand, Regime, TaxRulebook, TaxYear};
//!
//! let rulebook = TaxRulebook::builtin();
//! let table = rulebook
//!     .slab_table(TaxYear::FY_2025_26, Regime::Old, AgeBand::General)
//!     .unwrap();
//!
//! let result = SlabTaxCalculator::new(table).calculate(dec!(1150000));
//!
//! // 5% of 2.5L + 20% of 5L + 30% of 1.5L
//! assert_eq!(result.base_tax, dec!(157500));
//! assert_eq!(result.bracket_amounts.len(), 4);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::non_negative;
use crate::models::{BracketAmount, SlabTable};

/// Output of the slab walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTaxResult {
    pub base_tax: Decimal,
    /// One entry per bracket the income reached, in ascending order.
    pub bracket_amounts: Vec<BracketAmount>,
}

/// Calculator over one resolved [`SlabTable`].
#[derive(Debug, Clone, Copy)]
pub struct SlabTaxCalculator<'a> {
    table: &'a SlabTable,
}

impl<'a> SlabTaxCalculator<'a> {
    pub fn new(table: &'a SlabTable) -> Self {
        Self { table }
    }

    /// Tax on `taxable_income` with the per-bracket breakdown.
    pub fn calculate(
        &self,
        taxable_income: Decimal,
    ) -> SlabTaxResult {
        let income = non_negative(taxable_income);
        let bracket_amounts: Vec<BracketAmount> = self
            .table
            .brackets()
            .iter()
            .take_while(|bracket| income > bracket.lower_bound)
            .map(|bracket| {
                let taxable_amount = bracket.taxable_portion(income);
                BracketAmount {
                    lower_bound: bracket.lower_bound,
                    upper_bound: bracket.upper_bound,
                    rate: bracket.rate,
                    taxable_amount,
                    tax: taxable_amount * bracket.rate,
                }
            })
            .collect();

        let base_tax = bracket_amounts.iter().map(|b| b.tax).sum();

        SlabTaxResult {
            base_tax,
            bracket_amounts,
        }
    }

    /// Tax only, without building the breakdown.
    pub fn base_tax(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        let income = non_negative(taxable_income);
        self.table
            .brackets()
            .iter()
            .take_while(|bracket| income > bracket.lower_bound)
            .map(|bracket| bracket.taxable_portion(income) * bracket.rate)
            .sum()
    }
}
