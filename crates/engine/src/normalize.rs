//! Raw cell contents to canonical numbers and labels.
//!
//! Both functions are total: any input that cannot be interpreted degrades to
//! `0.0` (amounts) or `""` (labels).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cell::Cell;

static NUMERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?").unwrap());
static OTHER_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^other[:\s-]*").unwrap());

/// Tokens that stand for "no value" in submitted budgets.
const PLACEHOLDERS: &[&str] = &["-", "\u{2013}", "\u{2014}", "n/a"];

/// Numeric value of a cell. Empty, boolean and unparseable cells are `0.0`.
pub fn normalize_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty | Cell::Bool(_) => 0.0,
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) => 0.0,
        Cell::Text(s) => parse_amount(s),
    }
}

/// Parse a currency-ish string: `"$3,000"`, `"(1,250.50)"`, `"1500 / unit"`.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        return 0.0;
    }

    // Accounting negative: (100) -> -100
    let signed = if trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')') {
        format!("-{}", &trimmed[1..trimmed.len() - 1])
    } else {
        trimmed.to_string()
    };

    let cleaned = signed.replace(['$', ','], "");

    NUMERAL
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn is_placeholder(s: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| s.eq_ignore_ascii_case(p))
}

/// Human-readable description for an "other" line item.
///
/// Strips a leading `Other`/`Other:`/`Other -` and any parentheses.
pub fn normalize_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let without_prefix = OTHER_PREFIX.replace(trimmed, "");
    without_prefix.replace(['(', ')'], "").trim().to_string()
}
