//! Calculated vs. sheet-reported section totals.

use serde::Serialize;

/// Totals within this distance of zero count as absent.
const ZERO_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    /// Neither the line items nor the total line carried a value.
    Empty,
    /// Line items were found but the total line was blank.
    SheetTotalMissing,
    /// Calculated minus reported, beyond tolerance.
    Variance { delta: f64 },
    Reconciled,
}

impl Reconciliation {
    /// Flag text for this outcome, prefixed with the section's short name.
    pub fn flag(&self, prefix: &str) -> Option<String> {
        match self {
            Self::Empty => Some(format!("{prefix} Costs Empty")),
            Self::SheetTotalMissing => Some(format!("{prefix} Sheet Total Missing")),
            Self::Variance { delta } => Some(format!("{prefix} Variance (${delta:+.0})")),
            Self::Reconciled => None,
        }
    }
}

pub fn reconcile(calculated: f64, reported: f64, tolerance: f64) -> Reconciliation {
    let reported_zero = reported.abs() < ZERO_EPSILON;
    if reported_zero && calculated.abs() < ZERO_EPSILON {
        return Reconciliation::Empty;
    }
    if reported_zero {
        return Reconciliation::SheetTotalMissing;
    }
    let delta = calculated - reported;
    if delta.abs() > tolerance {
        Reconciliation::Variance { delta }
    } else {
        Reconciliation::Reconciled
    }
}
