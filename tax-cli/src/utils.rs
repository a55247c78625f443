use rust_decimal::Decimal;
use tax_core::{AgeBand, Regime};
use thiserror::Error;
use tracing::warn;

/// Error returned when a string cannot be parsed as a rupee amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace, drops a leading `₹` / `Rs` / `Rs.` and removes commas,
/// so both `12,00,000` and `1,200,000` read as twelve lakh.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let without_symbol = trimmed
        .strip_prefix('₹')
        .or_else(|| strip_prefix_ignore_case(trimmed, "rs."))
        .or_else(|| strip_prefix_ignore_case(trimmed, "rs"))
        .unwrap_or(trimmed);
    without_symbol.trim().replace(',', "")
}

fn strip_prefix_ignore_case<'a>(
    s: &'a str,
    prefix: &str,
) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Strict parse: empty input is 0, anything else must be a number.
/// Negative numbers are returned as-is.
pub fn try_parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|source| ParseAmountError {
        input: s.to_string(),
        source,
    })
}

/// Permissive parse used for every user-supplied amount.
///
/// Unparsable and negative input is coerced to 0 with a warning rather than
/// rejected.
pub fn parse_amount(s: &str) -> Decimal {
    match try_parse_amount(s) {
        Ok(amount) if amount < Decimal::ZERO => {
            warn!(input = %s, "negative amount treated as 0");
            Decimal::ZERO
        }
        Ok(amount) => amount,
        Err(e) => {
            warn!(input = %s, "{e}; treated as 0");
            Decimal::ZERO
        }
    }
}

/// `clap` value parser wrapping [`parse_amount`]; never fails.
pub fn amount_arg(s: &str) -> Result<Decimal, String> {
    Ok(parse_amount(s))
}

/// `clap` value parser for age bands (`general`, `senior`, `super-senior`).
pub fn age_band_arg(s: &str) -> Result<AgeBand, String> {
    AgeBand::parse(s)
        .ok_or_else(|| format!("unknown age band '{s}' (expected general, senior or super-senior)"))
}

/// `clap` value parser for `old` / `new`.
pub fn regime_arg(s: &str) -> Result<Regime, String> {
    Regime::parse(s).ok_or_else(|| format!("unknown regime '{s}' (expected old or new)"))
}

/// Reads a yes/no cell: `true`/`yes`/`y`/`1` and `false`/`no`/`n`/`0`,
/// case-insensitively. Empty is `false`.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" => Some(false),
        "true" | "yes" | "y" | "1" => Some(true),
        _ => None,
    }
}
