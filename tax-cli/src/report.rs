//! Plain-text rendering of comparison results.
//!
//! This is the only place amounts are rounded: every figure is shown to the
//! nearest rupee (half away from zero) with Indian digit grouping.

use std::fmt::Write;

use rust_decimal::Decimal;
use tax_core::calculations::common::round_rupee;
use tax_core::{
    AgeBand, ComparisonResult, ConfigurationGap, Regime, RegimeConfig, RegimeOutcome, RegimeRules,
    SlabTable, TaxYear,
};

use crate::scenarios::Scenario;

/// Formats an amount as whole rupees with lakh/crore grouping, e.g.
/// `₹1,63,800` or `₹1,00,00,000`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_rupee(amount);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}₹{}", group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Formats a fractional rate as a percentage, e.g. `0.05` as `5%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

fn regime_label(regime: Regime) -> &'static str {
    match regime {
        Regime::Old => "old regime",
        Regime::New => "new regime",
    }
}

fn age_band_label(age_band: AgeBand) -> &'static str {
    match age_band {
        AgeBand::General => "general (below 60)",
        AgeBand::Senior => "senior (60 to 79)",
        AgeBand::SuperSenior => "super senior (80+)",
    }
}

fn row(
    out: &mut String,
    label: &str,
    old: Decimal,
    new: Decimal,
) {
    let _ = writeln!(out, "{label:<26}{:>16}{:>16}", format_inr(old), format_inr(new));
}

fn brackets(
    out: &mut String,
    outcome: &RegimeOutcome,
) {
    let _ = writeln!(out, "\nSlab breakdown, {}:", regime_label(outcome.regime));
    for bracket in &outcome.breakdown.bracket_amounts {
        let range = match bracket.upper_bound {
            Some(upper) => format!("{} - {}", format_inr(bracket.lower_bound), format_inr(upper)),
            None => format!("above {}", format_inr(bracket.lower_bound)),
        };
        let _ = writeln!(
            out,
            "  {range:<30}{:>5} on {:>14} = {:>12}",
            format_rate(bracket.rate),
            format_inr(bracket.taxable_amount),
            format_inr(bracket.tax),
        );
    }
}

/// Side-by-side report for one comparison. With `show_brackets` the
/// per-bracket slab tax of each regime follows the summary.
pub fn render_comparison(
    result: &ComparisonResult,
    config: &RegimeConfig,
    show_brackets: bool,
) -> String {
    let mut out = String::new();
    let (old, new) = (&result.old, &result.new);

    let _ = writeln!(
        out,
        "Fiscal year {}, {} taxpayer",
        config.year,
        age_band_label(config.age_band)
    );
    let _ = writeln!(out, "{:<26}{:>16}", "Total income", format_inr(result.total_income));
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<26}{:>16}{:>16}", "", "Old regime", "New regime");
    row(&mut out, "Deductions", old.deductions.total, new.deductions.total);
    row(&mut out, "Taxable income", old.taxable_income, new.taxable_income);
    row(&mut out, "Tax on slabs", old.breakdown.base_tax, new.breakdown.base_tax);
    row(&mut out, "Rebate (s.87A)", old.breakdown.rebate, new.breakdown.rebate);
    row(&mut out, "Surcharge", old.breakdown.surcharge, new.breakdown.surcharge);
    if old.breakdown.marginal_relief > Decimal::ZERO || new.breakdown.marginal_relief > Decimal::ZERO {
        row(
            &mut out,
            "  after marginal relief of",
            old.breakdown.marginal_relief,
            new.breakdown.marginal_relief,
        );
    }
    row(&mut out, "Health & education cess", old.breakdown.cess, new.breakdown.cess);
    row(&mut out, "Total tax", old.total_tax(), new.total_tax());
    let _ = writeln!(out);

    if result.savings_amount.is_zero() {
        let _ = writeln!(out, "Both regimes cost the same; the old regime is recommended.");
    } else {
        let _ = writeln!(
            out,
            "Recommended: {} (saves {})",
            regime_label(result.recommended_regime),
            format_inr(result.savings_amount)
        );
    }

    if show_brackets {
        brackets(&mut out, old);
        brackets(&mut out, new);
    }

    out
}

/// One scenario of a batch run and its outcome.
pub struct BatchRow<'a> {
    pub scenario: &'a Scenario,
    pub result: Result<ComparisonResult, ConfigurationGap>,
}

/// One line per scenario. Scenarios whose year or age band has no rules
/// are listed with the reason instead of figures.
pub fn render_batch(rows: &[BatchRow<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20}{:>11}{:>14}{:>16}{:>16}{:>8}{:>16}",
        "Scenario", "Year", "Age band", "Old regime", "New regime", "Pick", "Savings"
    );

    for row in rows {
        let scenario = row.scenario;
        match &row.result {
            Ok(result) => {
                let _ = writeln!(
                    out,
                    "{:<20}{:>11}{:>14}{:>16}{:>16}{:>8}{:>16}",
                    scenario.name,
                    scenario.config.year.to_string(),
                    scenario.config.age_band.as_str(),
                    format_inr(result.old.total_tax()),
                    format_inr(result.new.total_tax()),
                    result.recommended_regime.as_str(),
                    format_inr(result.savings_amount),
                );
            }
            Err(gap) => {
                let _ = writeln!(out, "{:<20} error: {gap}", scenario.name);
            }
        }
    }

    out
}

/// Slab table and the remaining rules for one `(year, regime, age band)`.
pub fn render_rules(
    year: TaxYear,
    regime: Regime,
    age_band: AgeBand,
    table: &SlabTable,
    rules: &RegimeRules,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Slabs for the {}, {year}, {} taxpayers:",
        regime_label(regime),
        age_band_label(age_band)
    );
    for bracket in table.brackets() {
        let range = match bracket.upper_bound {
            Some(upper) => format!("{} - {}", format_inr(bracket.lower_bound), format_inr(upper)),
            None => format!("above {}", format_inr(bracket.lower_bound)),
        };
        let _ = writeln!(out, "  {range:<30}{:>5}", format_rate(bracket.rate));
    }

    let _ = writeln!(out);
    let relief = if rules.rebate_marginal_relief {
        ", with marginal relief"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "Rebate (s.87A): taxable income up to {}{relief}",
        format_inr(rules.rebate_threshold)
    );
    for tier in &rules.surcharge {
        let _ = writeln!(
            out,
            "Surcharge: {} above {}",
            format_rate(tier.rate),
            format_inr(tier.above)
        );
    }
    let _ = writeln!(out, "Cess: {}", format_rate(rules.cess_rate));

    out
}
