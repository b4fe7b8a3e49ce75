//! Section ledgers: labeled line items between a header row and its total row.
//!
//! ```text
//!   CONSTRUCTION INTEREST & FEES          <- start marker
//!   Construction Loan Interest   420,000
//!   Origination Fee               35,000
//!   Other: Bridge Loan Fee        12,500
//!   Total Construction Interest  467,500  <- end marker (reported total)
//! ```
//!
//! Every row strictly between the markers that carries a sizeable number
//! becomes a [`LineItem`]; the end row's largest number is the sheet's own
//! reported total.
//!
//! Amounts here come from [`cell_number`], which is stricter than
//! [`crate::normalize::parse_amount`]: a text cell counts only when the whole
//! cell is an amount. Budget rows mix labels and figures, and the lenient
//! first-numeral parse would read "Unit 101 Reserve" as 101. So "1500 USD" or
//! "1,500 (est.)" are labels to a section or hard-cost scan, while the
//! proximity scans for units and area still accept them.

use crate::cell::Cell;
use crate::normalize::normalize_label;
use crate::proximity::{is_excluded, Exclusion};
use crate::search::{find_first_row, find_matching_rows, KeywordSpec};
use crate::sheet::Sheet;

/// Label used when a row has no usable text.
pub const GENERIC_LABEL: &str = "Other Cost";

/// Labels shorter than this are replaced by [`GENERIC_LABEL`].
const MIN_LABEL_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub row: usize,
    pub label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionLedger {
    pub start_row: Option<usize>,
    pub end_row: Option<usize>,
    /// Line items in row order; labels are unique.
    pub items: Vec<LineItem>,
    pub reported_total: f64,
}

impl SectionLedger {
    /// Both markers were located.
    pub fn found(&self) -> bool {
        self.start_row.is_some() && self.end_row.is_some()
    }

    pub fn calculated_total(&self) -> f64 {
        self.items.iter().map(|i| i.amount).sum()
    }
}

/// True for [`GENERIC_LABEL`] and its collision-suffixed forms ("Other Cost 2").
pub fn is_generic_label(label: &str) -> bool {
    match label.strip_prefix(GENERIC_LABEL) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(' ')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// Thresholds applied to candidate amounts inside a section.
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// Amounts must exceed this magnitude (strictly) to count.
    pub min_magnitude: f64,
    /// Applied to whole-number candidates only, so `2025.50` survives a
    /// calendar-year band.
    pub exclusions: Vec<Exclusion>,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            min_magnitude: 100.0,
            exclusions: vec![crate::proximity::CALENDAR_YEARS],
        }
    }
}

/// Number held by a cell, if the cell is numeric or numeric-looking text.
///
/// Text counts only when it is nothing but an amount (`"$1,500"`,
/// `"(250)"`), so labels that embed a number ("Unit 101 Reserve") stay
/// labels.
pub fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => numeric_text(s),
        _ => None,
    }
}

/// Largest numeric value in `cells` above `min_magnitude`, `0.0` if none.
///
/// Whole numbers hit by `exclusions` are skipped.
pub fn largest_amount(cells: &[Cell], min_magnitude: f64, exclusions: &[Exclusion]) -> f64 {
    cells
        .iter()
        .filter_map(cell_number)
        .filter(|&v| v > min_magnitude)
        .filter(|v| !(v.fract() == 0.0 && is_excluded(*v, exclusions)))
        .fold(0.0, f64::max)
}

fn numeric_text(s: &str) -> Option<f64> {
    let t = s.trim();
    let negative = t.len() >= 2 && t.starts_with('(') && t.ends_with(')');
    let inner = if negative { &t[1..t.len() - 1] } else { t };
    let cleaned: String = inner.chars().filter(|c| !matches!(c, '$' | ',' | ' ')).collect();
    if cleaned.is_empty() {
        return None;
    }
    let n: f64 = cleaned.parse().ok().filter(|n: &f64| n.is_finite())?;
    Some(if negative { -n } else { n })
}

/// Delimit the section and extract its line items and reported total.
///
/// The end marker is the first match strictly after the start marker, so a
/// "Total …" line that precedes the header is ignored. A missing marker
/// yields an empty ledger with `found() == false`.
pub fn extract_section(
    sheet: &Sheet,
    start: &KeywordSpec,
    end: &KeywordSpec,
    options: &LedgerOptions,
) -> SectionLedger {
    let start_row = match find_first_row(sheet, start) {
        Some(r) => r,
        None => return SectionLedger::default(),
    };
    let end_row = match find_matching_rows(sheet, end).into_iter().find(|&r| r > start_row) {
        Some(r) => r,
        None => {
            return SectionLedger {
                start_row: Some(start_row),
                ..Default::default()
            }
        }
    };

    let reported_total = largest_amount(sheet.row(end_row), options.min_magnitude, &[]);

    let mut items: Vec<LineItem> = Vec::new();
    for row in (start_row + 1)..end_row {
        let cells = sheet.row(row);
        let amount = match row_amount(cells, options) {
            Some(a) => a,
            None => continue,
        };
        let label = unique_label(&items, canonical_label(row_label(cells)));
        items.push(LineItem { row, label, amount });
    }

    tracing::debug!(
        sheet = %sheet.name,
        start_row,
        end_row,
        items = items.len(),
        reported_total,
        "section ledger extracted"
    );

    SectionLedger {
        start_row: Some(start_row),
        end_row: Some(end_row),
        items,
        reported_total,
    }
}

/// Candidate with the greatest magnitude, sign preserved.
fn row_amount(cells: &[Cell], options: &LedgerOptions) -> Option<f64> {
    cells
        .iter()
        .filter_map(cell_number)
        .filter(|v| v.abs() > options.min_magnitude)
        .filter(|v| !(v.fract() == 0.0 && is_excluded(*v, &options.exclusions)))
        .fold(None, |best: Option<f64>, v| match best {
            Some(b) if b.abs() >= v.abs() => Some(b),
            _ => Some(v),
        })
}

/// Longest text token in the row, with digits and currency punctuation removed.
fn row_label(cells: &[Cell]) -> String {
    cells
        .iter()
        .filter_map(Cell::as_text)
        .filter(|s| !s.trim_start().starts_with('$') && numeric_text(s).is_none())
        .map(clean_label)
        .fold(String::new(), |best, l| if l.chars().count() > best.chars().count() { l } else { best })
}

fn clean_label(raw: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !c.is_ascii_digit() && !matches!(c, '$' | ',' | '(' | ')'))
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '.' | '%'))
        .to_string()
}

fn canonical_label(label: String) -> String {
    if label.chars().count() < MIN_LABEL_LEN {
        GENERIC_LABEL.to_string()
    } else if label.to_lowercase().contains("other") {
        // One canonical prefix, even when the sheet already wrote "Other:".
        let rest = normalize_label(&label);
        if rest.chars().count() < MIN_LABEL_LEN {
            GENERIC_LABEL.to_string()
        } else {
            format!("Other: {}", rest)
        }
    } else {
        label
    }
}

fn unique_label(items: &[LineItem], label: String) -> String {
    if !items.iter().any(|i| i.label == label) {
        return label;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{} {}", label, n);
        if !items.iter().any(|i| i.label == candidate) {
            return candidate;
        }
        n += 1;
    }
}
