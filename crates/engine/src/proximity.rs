//! Bounded-window numeric scan below anchor rows.
//!
//! Every cell in `anchor..=anchor + window` is normalized and tested against a
//! [`ValueRange`] and a list of [`Exclusion`]s. The largest surviving value
//! wins: stray labels (question numbers, row counters) are systematically
//! smaller than the metric the anchor introduces.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_amount;
use crate::sheet::Sheet;

/// Inclusive acceptance range for a semantic field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    /// Reject values with a fractional part (unit counts).
    #[serde(default)]
    pub integral: bool,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max, integral: false }
    }

    pub const fn integral(min: f64, max: f64) -> Self {
        Self { min, max, integral: true }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max && (!self.integral || value.fract() == 0.0)
    }
}

/// A value that is never accepted, even when inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// A known artifact literal, e.g. the question marker `9`.
    Exact(f64),
    /// An inclusive band, e.g. calendar years.
    Range(f64, f64),
}

impl Exclusion {
    pub fn excludes(&self, value: f64) -> bool {
        match *self {
            Exclusion::Exact(v) => value == v,
            Exclusion::Range(lo, hi) => value >= lo && value <= hi,
        }
    }
}

/// Calendar years that show up as application round / placed-in-service dates.
pub const CALENDAR_YEARS: Exclusion = Exclusion::Range(2018.0, 2030.0);

pub fn is_excluded(value: f64, exclusions: &[Exclusion]) -> bool {
    exclusions.iter().any(|e| e.excludes(value))
}

/// Every accepted candidate in the windows below `anchor_rows`, in scan order.
pub fn scalar_candidates(
    sheet: &Sheet,
    anchor_rows: &[usize],
    window: usize,
    range: ValueRange,
    exclusions: &[Exclusion],
) -> Vec<f64> {
    let mut candidates = Vec::new();
    let last_row = sheet.row_count();

    for &anchor in anchor_rows {
        let end = anchor.saturating_add(window).saturating_add(1).min(last_row);
        for row in anchor..end {
            for cell in sheet.row(row) {
                let value = normalize_amount(cell);
                if range.contains(value) && !is_excluded(value, exclusions) {
                    candidates.push(value);
                }
            }
        }
    }

    candidates
}

/// Largest accepted value near any anchor, or `0.0`.
pub fn extract_scalar(
    sheet: &Sheet,
    anchor_rows: &[usize],
    window: usize,
    range: ValueRange,
    exclusions: &[Exclusion],
) -> f64 {
    let best = scalar_candidates(sheet, anchor_rows, window, range, exclusions)
        .into_iter()
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))));

    if let Some(v) = best {
        tracing::debug!(sheet = %sheet.name, value = v, "proximity scan accepted value");
    }
    best.unwrap_or(0.0)
}
