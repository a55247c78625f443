use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use tax_cli::config::AppConfig;
use tax_cli::report::{self, BatchRow};
use tax_cli::utils::{age_band_arg, amount_arg, regime_arg};
use tax_cli::{app, logging, scenarios};
use tax_core::calculations::{CachedComparator, RegimeComparator, hra_exemption};
use tax_core::{
    AgeBand, DeductionInputs, HraInputs, IncomeProfile, Regime, RegimeConfig, TaxRulebook, TaxYear,
};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Compare Indian income tax under the old and new regimes.
///
/// Built-in rules cover fiscal years 2024-25 and 2025-26. Use `--slabs` and
/// `--rules` to add or replace years.
#[derive(Debug, Parser)]
#[command(name = "regime-compare", version)]
struct Cli {
    /// Config file. Defaults to `regime-compare.toml` if it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Slab tables CSV overlaid on the built-in rules.
    #[arg(long, global = true)]
    slabs: Option<PathBuf>,

    /// Regime rules TOML overlaid on the built-in rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,tax_core=debug`.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare both regimes for one taxpayer.
    Compare(CompareArgs),
    /// Compare every scenario in a CSV file.
    Batch(BatchArgs),
    /// Work out the exempt part of a house-rent allowance.
    Hra(HraArgs),
    /// Print the slab table and rules for a fiscal year.
    Slabs(SlabsArgs),
}

#[derive(Debug, Args)]
struct YearArgs {
    /// Fiscal year, e.g. `2025-2026` or `2025-26`. Defaults to the latest
    /// year with rules.
    #[arg(long)]
    year: Option<TaxYear>,

    /// `general`, `senior` (60 to 79) or `super-senior` (80 and over).
    #[arg(long, value_parser = age_band_arg, conflicts_with = "age")]
    age_band: Option<AgeBand>,

    /// Taxpayer age in years; picks the age band.
    #[arg(long)]
    age: Option<u32>,
}

#[derive(Debug, Args)]
struct CompareArgs {
    #[command(flatten)]
    year: YearArgs,

    /// Gross annual salary. Accepts `12,00,000`, `₹1200000`, `Rs 12,00,000`.
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    salary: Decimal,

    #[arg(long, value_parser = amount_arg, default_value = "0")]
    other_income: Decimal,

    /// Savings and deposit interest.
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    interest_income: Decimal,

    #[arg(long, value_parser = amount_arg, default_value = "0")]
    section_80c: Decimal,

    /// Medical insurance premium for self and family (§80D).
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    medical_self: Decimal,

    /// Medical insurance premium for parents (§80D).
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    medical_parents: Decimal,

    /// The insured parents are senior citizens.
    #[arg(long)]
    parents_senior: bool,

    /// Additional NPS contribution (§80CCD(1B)).
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    nps: Decimal,

    /// Exempt HRA. When omitted it is worked out from the `--basic-salary`,
    /// `--hra-received`, `--rent-paid` and `--metro` flags.
    #[arg(long, value_parser = amount_arg)]
    hra_exemption: Option<Decimal>,

    #[command(flatten)]
    hra: HraArgs,

    /// Interest on a self-occupied home loan (§24(b)).
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    home_loan_interest: Decimal,

    #[arg(long, value_parser = amount_arg, default_value = "0")]
    professional_tax: Decimal,

    #[arg(long, value_parser = amount_arg, default_value = "0")]
    other_deductions: Decimal,

    /// Also print tax per slab for each regime.
    #[arg(long)]
    breakdown: bool,
}

#[derive(Debug, Args)]
struct HraArgs {
    /// Annual basic salary (plus dearness allowance).
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    basic_salary: Decimal,

    /// Annual HRA received from the employer.
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    hra_received: Decimal,

    /// Annual rent paid.
    #[arg(long, value_parser = amount_arg, default_value = "0")]
    rent_paid: Decimal,

    /// The rented home is in Delhi, Mumbai, Kolkata or Chennai.
    #[arg(long)]
    metro: bool,
}

impl HraArgs {
    fn to_inputs(&self) -> HraInputs {
        HraInputs {
            basic_salary: self.basic_salary,
            hra_received: self.hra_received,
            rent_paid_annual: self.rent_paid,
            is_metro: self.metro,
        }
    }
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Scenario CSV; needs a `gross_salary` column, every other column is
    /// optional.
    path: PathBuf,

    // Year and age band for rows that leave them empty.
    #[command(flatten)]
    year: YearArgs,
}

#[derive(Debug, Args)]
struct SlabsArgs {
    #[command(flatten)]
    year: YearArgs,

    /// Only show one regime.
    #[arg(long, value_parser = regime_arg)]
    regime: Option<Regime>,
}

// ─── settings ────────────────────────────────────────────────────────────────

/// Command-line flags win over the config file, which wins over the
/// latest year in the rulebook and the general age band.
fn regime_config(
    args: &YearArgs,
    config: &AppConfig,
    rulebook: &TaxRulebook,
) -> Result<RegimeConfig> {
    let year = match args.year.or(config.year) {
        Some(year) => year,
        None => *rulebook
            .years()
            .last()
            .context("the rulebook has no fiscal years")?,
    };
    let age_band = args
        .age_band
        .or(args.age.map(AgeBand::for_age))
        .or(config.age_band)
        .unwrap_or_default();

    debug!(%year, age_band = age_band.as_str(), "resolved regime config");
    Ok(RegimeConfig::new(year, age_band))
}

// ─── commands ────────────────────────────────────────────────────────────────

fn run_compare(
    args: &CompareArgs,
    config: &AppConfig,
    rulebook: &TaxRulebook,
) -> Result<()> {
    let regime_config = regime_config(&args.year, config, rulebook)?;

    let hra = match args.hra_exemption {
        Some(amount) => amount,
        None => {
            let computed = hra_exemption(&args.hra.to_inputs());
            if !computed.is_zero() {
                info!(exemption = %computed, "HRA exemption worked out from rent details");
            }
            computed
        }
    };

    let income = IncomeProfile {
        gross_salary: args.salary,
        other_income: args.other_income,
        interest_income: args.interest_income,
    };
    let deductions = DeductionInputs {
        section_80c: args.section_80c,
        medical_self: args.medical_self,
        medical_parents: args.medical_parents,
        parents_senior: args.parents_senior,
        nps_80ccd_1b: args.nps,
        hra_exemption: hra,
        home_loan_interest: args.home_loan_interest,
        professional_tax: args.professional_tax,
        other_deductions: args.other_deductions,
    };

    let result = RegimeComparator::new(rulebook).compare(&income, &deductions, &regime_config)?;
    print!("{}", report::render_comparison(&result, &regime_config, args.breakdown));
    Ok(())
}

fn run_batch(
    args: &BatchArgs,
    config: &AppConfig,
    rulebook: &TaxRulebook,
) -> Result<()> {
    let defaults = regime_config(&args.year, config, rulebook)?;
    let scenarios = scenarios::load_from_file(&args.path, defaults)
        .with_context(|| format!("Failed to load scenarios: {}", args.path.display()))?;
    info!(count = scenarios.len(), path = %args.path.display(), "loaded scenarios");

    let mut comparator = CachedComparator::new(rulebook);
    let rows: Vec<BatchRow<'_>> = scenarios
        .iter()
        .map(|scenario| BatchRow {
            scenario,
            result: comparator.compare(&scenario.income, &scenario.deductions, &scenario.config),
        })
        .collect();
    debug!(hits = comparator.hits(), misses = comparator.misses(), "comparison cache");

    print!("{}", report::render_batch(&rows));

    let failed = rows.iter().filter(|row| row.result.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} scenarios could not be compared", rows.len());
    }
    Ok(())
}

fn run_hra(args: &HraArgs) {
    let exemption = hra_exemption(&args.to_inputs());
    let taxable = (args.hra_received - exemption).max(Decimal::ZERO);

    println!("HRA received     {:>14}", report::format_inr(args.hra_received));
    println!("Exempt           {:>14}", report::format_inr(exemption));
    println!("Taxable HRA      {:>14}", report::format_inr(taxable));
}

fn run_slabs(
    args: &SlabsArgs,
    config: &AppConfig,
    rulebook: &TaxRulebook,
) -> Result<()> {
    let regime_config = regime_config(&args.year, config, rulebook)?;
    let regimes = match args.regime {
        Some(regime) => vec![regime],
        None => Regime::all().to_vec(),
    };

    for (idx, regime) in regimes.into_iter().enumerate() {
        let table = rulebook.slab_table(regime_config.year, regime, regime_config.age_band)?;
        let rules = rulebook.regime_rules(regime_config.year, regime)?;
        if idx > 0 {
            println!();
        }
        print!(
            "{}",
            report::render_rules(regime_config.year, regime, regime_config.age_band, table, rules)
        );
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level.as_deref().or(config.log_level.as_deref()) {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &config.log_file {
        logging::enable_file_logging(path)?;
    }

    let rulebook = app::load_rulebook(
        cli.slabs.as_deref().or(config.slabs.as_deref()),
        cli.rules.as_deref().or(config.rules.as_deref()),
    )?;

    match &cli.command {
        Command::Compare(args) => run_compare(args, &config, &rulebook),
        Command::Batch(args) => run_batch(args, &config, &rulebook),
        Command::Hra(args) => {
            run_hra(args);
            Ok(())
        }
        Command::Slabs(args) => run_slabs(args, &config, &rulebook),
    }
}
