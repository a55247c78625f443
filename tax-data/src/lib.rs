//! Loaders that turn fiscal-year data files into [`tax_core::TaxRulebook`]
//! entries.
//!
//! Slab tables come from CSV, per-regime rules from TOML. The files under
//! `data/` carry the same figures as [`tax_core::TaxRulebook::builtin`].

mod rules_loader;
mod slab_loader;

pub use rules_loader::{RegimeRulesLoader, RegimeRulesLoaderError, RegimeRulesRecord};
pub use slab_loader::{SlabTableLoader, SlabTableLoaderError, SlabTableRecord};

/// Built-in slab tables, as shipped in `data/slab_tables.csv`.
pub const BUILTIN_SLAB_TABLES_CSV: &str = include_str!("../data/slab_tables.csv");

/// Built-in regime rules, as shipped in `data/regime_rules.toml`.
pub const BUILTIN_REGIME_RULES_TOML: &str = include_str!("../data/regime_rules.toml");
