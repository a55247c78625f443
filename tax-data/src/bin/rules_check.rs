use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tax_core::{AgeBand, Regime, TaxRulebook};
use tax_data::{
    BUILTIN_REGIME_RULES_TOML, BUILTIN_SLAB_TABLES_CSV, RegimeRulesLoader, SlabTableLoader,
};

/// Parse and validate slab table and regime rule files.
///
/// With no arguments the shipped data files are checked. Each fiscal year
/// found is reported with the regimes and age bands it fully covers.
#[derive(Parser, Debug)]
#[command(name = "tax-rules-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Slab tables CSV (tax_year,regime,age_band,lower_bound,upper_bound,rate)
    #[arg(short, long)]
    slabs: Option<PathBuf>,

    /// Regime rules TOML
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Also require the files to match the built-in rulebook exactly
    #[arg(long, default_value_t = false)]
    against_builtin: bool,
}

fn read_or_builtin(
    path: Option<&PathBuf>,
    builtin: &str,
) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))
        }
        None => Ok(builtin.to_string()),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rulebook = TaxRulebook::new();

    let slabs = read_or_builtin(args.slabs.as_ref(), BUILTIN_SLAB_TABLES_CSV)?;
    let records = SlabTableLoader::parse(slabs.as_bytes()).context("Failed to parse slab tables")?;
    println!("Parsed {} slab brackets", records.len());
    let tables = SlabTableLoader::load(&mut rulebook, &records)
        .context("Failed to load slab tables")?;
    println!("Validated {} slab tables", tables);

    let rules = read_or_builtin(args.rules.as_ref(), BUILTIN_REGIME_RULES_TOML)?;
    let records = RegimeRulesLoader::parse(&rules).context("Failed to parse regime rules")?;
    let rule_sets = RegimeRulesLoader::load(&mut rulebook, &records)
        .context("Failed to load regime rules")?;
    println!("Validated {} regime rule sets", rule_sets);

    let mut gaps = 0;
    for year in rulebook.years() {
        for regime in Regime::all() {
            let missing: Vec<&str> = AgeBand::all()
                .iter()
                .filter(|band| rulebook.slab_table(year, *regime, **band).is_err())
                .map(|band| band.as_str())
                .collect();
            let has_rules = rulebook.regime_rules(year, *regime).is_ok();

            if missing.is_empty() && has_rules {
                println!("  {year} {regime}: complete");
            } else {
                gaps += 1;
                if !has_rules {
                    println!("  {year} {regime}: no regime rules");
                }
                if !missing.is_empty() {
                    println!("  {year} {regime}: no slab table for {}", missing.join(", "));
                }
            }
        }
    }

    if gaps > 0 {
        bail!("{} regime(s) have configuration gaps", gaps);
    }

    if args.against_builtin {
        if rulebook != TaxRulebook::builtin() {
            bail!("Data files differ from the built-in rulebook");
        }
        println!("Data files match the built-in rulebook.");
    }

    Ok(())
}
