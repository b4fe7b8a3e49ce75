use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sections + categories
// ---------------------------------------------------------------------------

/// The two financing-cost sections of a sources-and-uses budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Construction,
    Permanent,
}

impl SectionKind {
    /// Column and flag prefix ("Const", "Perm").
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Construction => "Const",
            Self::Permanent => "Perm",
        }
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construction => write!(f, "construction"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Fixed financing-cost taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    LoanInterest,
    OriginationFee,
    LoanOriginationFee,
    CreditEnhancement,
    BondPremium,
    CostOfIssuance,
    TitleRecording,
    Taxes,
    Insurance,
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoanInterest => "Loan Interest",
            Self::OriginationFee => "Origination Fee",
            Self::LoanOriginationFee => "Loan Origination Fee",
            Self::CreditEnhancement => "Credit Enhancement",
            Self::BondPremium => "Bond Premium",
            Self::CostOfIssuance => "Cost of Issuance",
            Self::TitleRecording => "Title & Recording",
            Self::Taxes => "Taxes",
            Self::Insurance => "Insurance",
        };
        f.write_str(name)
    }
}

/// Classified financing costs of one section.
#[derive(Debug, Clone, Serialize)]
pub struct SectionCosts {
    pub kind: SectionKind,
    /// Both section markers were found on the budget sheet.
    pub located: bool,
    pub amounts: BTreeMap<CostCategory, f64>,
    pub other_costs: f64,
    pub other_details: Vec<String>,
    pub calculated_total: f64,
    pub sheet_total: f64,
}

impl SectionCosts {
    pub fn empty(kind: SectionKind) -> Self {
        Self {
            kind,
            located: false,
            amounts: BTreeMap::new(),
            other_costs: 0.0,
            other_details: Vec::new(),
            calculated_total: 0.0,
            sheet_total: 0.0,
        }
    }

    /// Accumulated amount for a category; `0.0` when nothing matched it.
    pub fn amount(&self, category: CostCategory) -> f64 {
        self.amounts.get(&category).copied().unwrap_or(0.0)
    }

    pub fn other_details_joined(&self) -> String {
        self.other_details.join("; ")
    }
}

// ---------------------------------------------------------------------------
// Hard costs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardCostSource {
    NewConstruction,
    Rehab,
    ComponentSum,
    Missing,
}

impl std::fmt::Display for HardCostSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewConstruction => write!(f, "new_construction"),
            Self::Rehab => write!(f, "rehab"),
            Self::ComponentSum => write!(f, "component_sum"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HardCosts {
    pub amount: f64,
    pub source: HardCostSource,
}

impl HardCosts {
    pub fn missing() -> Self {
        Self {
            amount: 0.0,
            source: HardCostSource::Missing,
        }
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Append-only provenance and warning notes for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Flags(Vec<String>);

impl Flags {
    pub fn push(&mut self, flag: impl Into<String>) {
        self.0.push(flag.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any flag contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|f| f.contains(needle))
    }

    /// Output form: flags joined with `"; "`.
    pub fn joined(&self) -> String {
        self.0.join("; ")
    }
}

// ---------------------------------------------------------------------------
// Document record
// ---------------------------------------------------------------------------

/// Everything extracted from one workbook.
///
/// Numeric fields stay at zero when their source could not be found; the
/// matching explanation is in `flags`.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    pub file_name: String,
    pub flags: Flags,
    /// The workbook could not be opened; only `file_name` and `flags` are meaningful.
    pub failed: bool,
    pub budget_sheet: Option<String>,
    pub application_sheet: Option<String>,
    pub total_units: u32,
    pub total_sf: f64,
    pub hard_costs: HardCosts,
    pub construction: SectionCosts,
    pub permanent: SectionCosts,
    pub combined_financing: f64,
    pub cost_per_unit: f64,
    pub cost_per_sf: f64,
    pub pct_of_hard_costs: f64,
}

impl DocumentRecord {
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            flags: Flags::default(),
            failed: false,
            budget_sheet: None,
            application_sheet: None,
            total_units: 0,
            total_sf: 0.0,
            hard_costs: HardCosts::missing(),
            construction: SectionCosts::empty(SectionKind::Construction),
            permanent: SectionCosts::empty(SectionKind::Permanent),
            combined_financing: 0.0,
            cost_per_unit: 0.0,
            cost_per_sf: 0.0,
            pct_of_hard_costs: 0.0,
        }
    }

    pub fn section(&self, kind: SectionKind) -> &SectionCosts {
        match kind {
            SectionKind::Construction => &self.construction,
            SectionKind::Permanent => &self.permanent,
        }
    }
}
