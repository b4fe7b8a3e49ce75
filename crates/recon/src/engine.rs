use std::fmt;

use costgrid_engine::proximity::{extract_scalar, scalar_candidates};
use costgrid_engine::search::find_matching_rows;
use costgrid_engine::section::extract_section;
use costgrid_engine::{Sheet, Workbook};

use crate::classify::classify_section;
use crate::config::{ExtractConfig, SectionMarkers};
use crate::discovery::{area_search_order, find_application_sheet, find_budget_sheet};
use crate::hard_costs::{compute_hard_costs, source_flag};
use crate::model::{DocumentRecord, HardCosts, SectionCosts, SectionKind};
use crate::reconcile::reconcile;

/// Build the full record for one loaded workbook.
///
/// Never fails: anything that cannot be found stays at zero and leaves a flag.
/// Fields are filled in a fixed order (units, area, financing sections, hard
/// costs, ratios) so flags always appear in the same sequence.
pub fn build_record(file_name: &str, wb: &Workbook, config: &ExtractConfig) -> DocumentRecord {
    let mut record = DocumentRecord::new(file_name);

    let app_idx = find_application_sheet(wb, config);
    let budget_idx = find_budget_sheet(wb, config);
    record.application_sheet = app_idx.and_then(|i| wb.sheet(i)).map(|s| s.name.clone());
    record.budget_sheet = budget_idx.and_then(|i| wb.sheet(i)).map(|s| s.name.clone());

    tracing::debug!(
        file = file_name,
        app = ?record.application_sheet,
        budget = ?record.budget_sheet,
        "sheets discovered"
    );

    // --- Units ---
    match app_idx.and_then(|i| wb.sheet(i)) {
        Some(app) => {
            record.total_units = extract_units(app, config);
            if record.total_units > 0 && record.total_units < config.units.low_count_below {
                record
                    .flags
                    .push(format!("Low Unit Count (<{})", config.units.low_count_below));
            }
        }
        None => record.flags.push("App Tab Missing"),
    }
    if record.total_units == 0 {
        record.flags.push("Units Missing");
    }

    // --- Area ---
    record.total_sf = extract_area(wb, config);
    if record.total_sf > 0.0 {
        if app_idx.is_none() {
            record.flags.push("SF Source: Non-App Tab");
        }
    } else {
        record.flags.push("SF Missing");
    }

    // --- Financing sections ---
    let budget = budget_idx.and_then(|i| wb.sheet(i));
    if budget.is_none() {
        record.flags.push("Sources Tab Missing");
    }
    record.construction = section_costs(&mut record, budget, SectionKind::Construction, config);
    record.permanent = section_costs(&mut record, budget, SectionKind::Permanent, config);

    // --- Hard costs ---
    record.hard_costs = match budget {
        Some(sheet) => compute_hard_costs(sheet, config),
        None => HardCosts::missing(),
    };
    if let Some(flag) = source_flag(record.hard_costs.source) {
        record.flags.push(flag);
    }

    // --- Ratios ---
    let combined = record.construction.calculated_total + record.permanent.calculated_total;
    record.combined_financing = combined;
    if record.total_units > 0 {
        record.cost_per_unit = combined / f64::from(record.total_units);
    }
    if record.total_sf > 0.0 {
        record.cost_per_sf = combined / record.total_sf;
    }
    if record.hard_costs.amount > 0.0 {
        record.pct_of_hard_costs = combined / record.hard_costs.amount * 100.0;
    }

    tracing::debug!(
        file = file_name,
        units = record.total_units,
        sf = record.total_sf,
        combined,
        flags = record.flags.len(),
        "record built"
    );

    record
}

/// Record for a workbook that could not be opened at all.
pub fn failed_record(file_name: &str, err: &dyn fmt::Display) -> DocumentRecord {
    let mut record = DocumentRecord::new(file_name);
    record.failed = true;
    record.flags.push(format!("Error: {err}"));
    record
}

fn extract_units(app: &Sheet, config: &ExtractConfig) -> u32 {
    let anchors = find_matching_rows(app, &config.units.keywords);
    let value = extract_scalar(
        app,
        &anchors,
        config.units.window,
        config.units.range(),
        &config.exclusions(),
    );
    // Non-integral values only survive the loose policy; round to a count.
    value.round() as u32
}

fn extract_area(wb: &Workbook, config: &ExtractConfig) -> f64 {
    let exclusions = config.exclusions();
    area_search_order(wb, config)
        .into_iter()
        .filter_map(|i| wb.sheet(i))
        .flat_map(|sheet| {
            let anchors = find_matching_rows(sheet, &config.area.keywords);
            scalar_candidates(sheet, &anchors, config.area.window, config.area.range(), &exclusions)
        })
        .fold(0.0, f64::max)
}

fn markers(config: &ExtractConfig, kind: SectionKind) -> &SectionMarkers {
    match kind {
        SectionKind::Construction => &config.sections.construction,
        SectionKind::Permanent => &config.sections.permanent,
    }
}

fn section_costs(
    record: &mut DocumentRecord,
    budget: Option<&Sheet>,
    kind: SectionKind,
    config: &ExtractConfig,
) -> SectionCosts {
    let prefix = kind.prefix();
    let costs = match budget {
        Some(sheet) => {
            let m = markers(config, kind);
            let ledger = extract_section(sheet, &m.start, &m.end, &config.ledger_options());
            if !ledger.found() {
                record.flags.push(format!("{prefix} Section Missing"));
            }
            classify_section(kind, &ledger)
        }
        None => SectionCosts::empty(kind),
    };

    let outcome = reconcile(costs.calculated_total, costs.sheet_total, config.money.tolerance);
    if let Some(flag) = outcome.flag(prefix) {
        record.flags.push(flag);
    }
    costs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostCategory, HardCostSource};
    use costgrid_engine::sheet::sheet_from_strs;

    fn application() -> Sheet {
        sheet_from_strs(
            "Application",
            &[
                &["Project Name", "Maple Court"],
                &["Total # of Units", "", "9"],
                &["", "2025", "64"],
                &["Net Rentable Sq. Ft.", "48,500"],
            ],
        )
    }

    fn budget() -> Sheet {
        sheet_from_strs(
            "Sources and Uses Budget",
            &[
                &["NEW CONSTRUCTION"],
                &["Structures", "12,000,000"],
                &["Total New Construction Costs", "12,800,000"],
                &["CONSTRUCTION INTEREST & FEES"],
                &["Construction Loan Interest", "600,000"],
                &["Origination Fee", "90,000"],
                &["Other: Bridge Loan Fee", "10,000"],
                &["Total Construction Interest & Fees", "700,000"],
                &["PERMANENT FINANCING"],
                &["Loan Origination Fee", "40,000"],
                &["Title & Recording", "8,000"],
                &["Total Permanent Financing Costs", "50,000"],
            ],
        )
    }

    #[test]
    fn full_record() {
        let wb = Workbook::from_sheets(vec![application(), budget()]);
        let r = build_record("maple.xlsx", &wb, &ExtractConfig::default());

        assert_eq!(r.application_sheet.as_deref(), Some("Application"));
        assert_eq!(r.budget_sheet.as_deref(), Some("Sources and Uses Budget"));
        assert_eq!(r.total_units, 64);
        assert_eq!(r.total_sf, 48_500.0);
        assert_eq!(r.hard_costs.amount, 12_800_000.0);
        assert_eq!(r.hard_costs.source, HardCostSource::NewConstruction);

        assert_eq!(r.construction.amount(CostCategory::LoanInterest), 600_000.0);
        assert_eq!(r.construction.other_details_joined(), "Bridge Loan Fee");
        assert_eq!(r.construction.calculated_total, 700_000.0);
        assert_eq!(r.permanent.amount(CostCategory::LoanOriginationFee), 40_000.0);
        assert_eq!(r.permanent.calculated_total, 48_000.0);

        assert_eq!(r.combined_financing, 748_000.0);
        assert_eq!(r.cost_per_unit, 748_000.0 / 64.0);
        assert_eq!(r.cost_per_sf, 748_000.0 / 48_500.0);
        assert_eq!(r.pct_of_hard_costs, 748_000.0 / 12_800_000.0 * 100.0);

        assert_eq!(r.flags.joined(), "Perm Variance ($-2000)");
    }

    #[test]
    fn low_unit_count() {
        let mut cfg = ExtractConfig::default();
        cfg.units.min = 1.0;
        let app = sheet_from_strs("Application", &[&["Total Units", "3"]]);
        let wb = Workbook::from_sheets(vec![app]);
        let r = build_record("tiny.xlsx", &wb, &cfg);
        assert_eq!(r.total_units, 3);
        assert!(r.flags.contains("Low Unit Count (<5)"));
        assert!(!r.flags.contains("Units Missing"));
    }

    #[test]
    fn missing_sections_on_budget_sheet() {
        let wb = Workbook::from_sheets(vec![sheet_from_strs("S&U", &[&["Land", "1,000,000"]])]);
        let r = build_record("bare.xlsx", &wb, &ExtractConfig::default());
        assert_eq!(
            r.flags.iter().collect::<Vec<_>>(),
            vec![
                "App Tab Missing",
                "Units Missing",
                "SF Missing",
                "Const Section Missing",
                "Const Costs Empty",
                "Perm Section Missing",
                "Perm Costs Empty",
                "Hard Costs Missing",
            ]
        );
    }

    #[test]
    fn failed_record_only_has_error_flag() {
        let r = failed_record("broken.xlsx", &"unsupported file format");
        assert!(r.failed);
        assert_eq!(r.flags.joined(), "Error: unsupported file format");
        assert_eq!(r.total_units, 0);
    }
}
