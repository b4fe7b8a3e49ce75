//! Summary CSV: one row per document, fixed column order.

use std::io::Write;

use costgrid_recon::model::{CostCategory, DocumentRecord};
use serde::Serialize;

use crate::error::ExportError;

/// Flat output row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "File Name")]
    pub file_name: String,
    #[serde(rename = "Flag")]
    pub flag: String,
    #[serde(rename = "Combined Financing Costs")]
    pub combined_financing: f64,
    #[serde(rename = "Financing Cost per Unit")]
    pub cost_per_unit: f64,
    #[serde(rename = "Financing Cost per SF")]
    pub cost_per_sf: f64,
    #[serde(rename = "% of Hard Costs")]
    pub pct_of_hard_costs: f64,
    #[serde(rename = "Total Units")]
    pub total_units: u32,
    #[serde(rename = "Total SF")]
    pub total_sf: f64,
    #[serde(rename = "Hard Costs")]
    pub hard_costs: f64,

    #[serde(rename = "Const Total (Sheet)")]
    pub const_total_sheet: f64,
    #[serde(rename = "Const Total (Calculated)")]
    pub const_total_calculated: f64,
    #[serde(rename = "Const Loan Interest")]
    pub const_loan_interest: f64,
    #[serde(rename = "Const Origination Fee")]
    pub const_origination_fee: f64,
    #[serde(rename = "Const Credit Enhancement")]
    pub const_credit_enhancement: f64,
    #[serde(rename = "Const Bond Premium")]
    pub const_bond_premium: f64,
    #[serde(rename = "Const Cost of Issuance")]
    pub const_cost_of_issuance: f64,
    #[serde(rename = "Const Title & Recording")]
    pub const_title_recording: f64,
    #[serde(rename = "Const Taxes")]
    pub const_taxes: f64,
    #[serde(rename = "Const Insurance")]
    pub const_insurance: f64,
    #[serde(rename = "Const Other Costs")]
    pub const_other_costs: f64,
    #[serde(rename = "Const Other Details")]
    pub const_other_details: String,

    #[serde(rename = "Perm Total (Sheet)")]
    pub perm_total_sheet: f64,
    #[serde(rename = "Perm Total (Calculated)")]
    pub perm_total_calculated: f64,
    #[serde(rename = "Perm Loan Origination Fee")]
    pub perm_loan_origination_fee: f64,
    #[serde(rename = "Perm Credit Enhancement")]
    pub perm_credit_enhancement: f64,
    #[serde(rename = "Perm Title & Recording")]
    pub perm_title_recording: f64,
    #[serde(rename = "Perm Taxes")]
    pub perm_taxes: f64,
    #[serde(rename = "Perm Insurance")]
    pub perm_insurance: f64,
    #[serde(rename = "Perm Other Costs")]
    pub perm_other_costs: f64,
    #[serde(rename = "Perm Other Details")]
    pub perm_other_details: String,
}

impl From<&DocumentRecord> for SummaryRow {
    fn from(r: &DocumentRecord) -> Self {
        let c = &r.construction;
        let p = &r.permanent;
        Self {
            file_name: r.file_name.clone(),
            flag: r.flags.joined(),
            combined_financing: r.combined_financing,
            cost_per_unit: r.cost_per_unit,
            cost_per_sf: r.cost_per_sf,
            pct_of_hard_costs: r.pct_of_hard_costs,
            total_units: r.total_units,
            total_sf: r.total_sf,
            hard_costs: r.hard_costs.amount,

            const_total_sheet: c.sheet_total,
            const_total_calculated: c.calculated_total,
            const_loan_interest: c.amount(CostCategory::LoanInterest),
            const_origination_fee: c.amount(CostCategory::OriginationFee),
            const_credit_enhancement: c.amount(CostCategory::CreditEnhancement),
            const_bond_premium: c.amount(CostCategory::BondPremium),
            const_cost_of_issuance: c.amount(CostCategory::CostOfIssuance),
            const_title_recording: c.amount(CostCategory::TitleRecording),
            const_taxes: c.amount(CostCategory::Taxes),
            const_insurance: c.amount(CostCategory::Insurance),
            const_other_costs: c.other_costs,
            const_other_details: c.other_details_joined(),

            perm_total_sheet: p.sheet_total,
            perm_total_calculated: p.calculated_total,
            perm_loan_origination_fee: p.amount(CostCategory::LoanOriginationFee),
            perm_credit_enhancement: p.amount(CostCategory::CreditEnhancement),
            perm_title_recording: p.amount(CostCategory::TitleRecording),
            perm_taxes: p.amount(CostCategory::Taxes),
            perm_insurance: p.amount(CostCategory::Insurance),
            perm_other_costs: p.other_costs,
            perm_other_details: p.other_details_joined(),
        }
    }
}

/// Column names in output order.
pub const COLUMNS: &[&str] = &[
    "File Name",
    "Flag",
    "Combined Financing Costs",
    "Financing Cost per Unit",
    "Financing Cost per SF",
    "% of Hard Costs",
    "Total Units",
    "Total SF",
    "Hard Costs",
    "Const Total (Sheet)",
    "Const Total (Calculated)",
    "Const Loan Interest",
    "Const Origination Fee",
    "Const Credit Enhancement",
    "Const Bond Premium",
    "Const Cost of Issuance",
    "Const Title & Recording",
    "Const Taxes",
    "Const Insurance",
    "Const Other Costs",
    "Const Other Details",
    "Perm Total (Sheet)",
    "Perm Total (Calculated)",
    "Perm Loan Origination Fee",
    "Perm Credit Enhancement",
    "Perm Title & Recording",
    "Perm Taxes",
    "Perm Insurance",
    "Perm Other Costs",
    "Perm Other Details",
];

/// Render the summary CSV. The header is written even with no records.
pub fn render_summary(records: &[DocumentRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(COLUMNS)
        .map_err(|e| ExportError::Csv(e.to_string()))?;
    for record in records {
        writer
            .serialize(SummaryRow::from(record))
            .map_err(|e| ExportError::Csv(e.to_string()))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.to_string()))
}

/// Write the summary CSV to `out` and return its fingerprint.
pub fn write_summary<W: Write>(records: &[DocumentRecord], mut out: W) -> Result<String, ExportError> {
    let bytes = render_summary(records)?;
    out.write_all(&bytes).map_err(|e| ExportError::Io(e.to_string()))?;
    out.flush().map_err(|e| ExportError::Io(e.to_string()))?;
    Ok(fingerprint(&bytes))
}

/// Content hash of rendered output, `blake3:<hex>`.
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("blake3:{}", blake3::hash(bytes).to_hex())
}
