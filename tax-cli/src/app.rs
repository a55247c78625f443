use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tax_core::TaxRulebook;
use tax_data::{RegimeRulesLoader, SlabTableLoader};
use tracing::info;

/// Builds the rulebook used for a run: the built-in rules, with any slab
/// tables and regime rules from the given files overlaid.
///
/// Overlay entries replace built-in entries with the same key and may add
/// fiscal years the built-in rules do not cover.
pub fn load_rulebook(
    slabs: Option<&Path>,
    rules: Option<&Path>,
) -> Result<TaxRulebook> {
    let mut rulebook = TaxRulebook::builtin();

    if let Some(path) = slabs {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open slab tables: {}", path.display()))?;
        let records = SlabTableLoader::parse(file)
            .with_context(|| format!("Failed to parse slab tables: {}", path.display()))?;
        let loaded = SlabTableLoader::load(&mut rulebook, &records)
            .with_context(|| format!("Invalid slab tables in {}", path.display()))?;
        info!(path = %path.display(), tables = loaded, "overlaid slab tables");
    }

    if let Some(path) = rules {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read regime rules: {}", path.display()))?;
        let records = RegimeRulesLoader::parse(&contents)
            .with_context(|| format!("Failed to parse regime rules: {}", path.display()))?;
        let loaded = RegimeRulesLoader::load(&mut rulebook, &records)
            .with_context(|| format!("Invalid regime rules in {}", path.display()))?;
        info!(path = %path.display(), rule_sets = loaded, "overlaid regime rules");
    }

    Ok(rulebook)
}
