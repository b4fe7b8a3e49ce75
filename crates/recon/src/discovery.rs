//! Which sheet holds what, decided from sheet names alone.

use costgrid_engine::Workbook;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractConfig;

static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

/// Index of the sources-and-uses budget sheet.
pub fn find_budget_sheet(wb: &Workbook, config: &ExtractConfig) -> Option<usize> {
    first_pattern_match(wb, &config.sheets.budget)
}

/// Index of the application sheet.
///
/// Falls back to the first sheet when its name carries a year in the
/// configured range (e.g. "2025 4% Application Form" renamed to "2025").
pub fn find_application_sheet(wb: &Workbook, config: &ExtractConfig) -> Option<usize> {
    if let Some(idx) = first_pattern_match(wb, &config.sheets.application) {
        return Some(idx);
    }
    if !config.sheets.year_named_application {
        return None;
    }
    let first = wb.sheet(0)?;
    let year_named = FOUR_DIGITS
        .find_iter(&first.name)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .any(|y| config.years.contains(y));
    year_named.then_some(0)
}

/// Sheets searched for building area: application-like sheets first, then
/// the rest, minus anything named like a budget or financing sheet.
pub fn area_search_order(wb: &Workbook, config: &ExtractConfig) -> Vec<usize> {
    let app_like = |name: &str| {
        config
            .sheets
            .application
            .iter()
            .any(|p| p.iter().all(|needle| name.contains(needle.as_str())))
    };
    let skipped = |name: &str| config.sheets.area_skip.iter().any(|s| name.contains(s.as_str()));

    let names = wb.sheet_names();
    let (first, rest): (Vec<usize>, Vec<usize>) = (0..names.len())
        .filter(|&i| !skipped(names[i]))
        .partition(|&i| app_like(names[i]));
    first.into_iter().chain(rest).collect()
}

fn first_pattern_match(wb: &Workbook, patterns: &[Vec<String>]) -> Option<usize> {
    patterns.iter().find_map(|p| {
        let needles: Vec<&str> = p.iter().map(String::as_str).collect();
        wb.find_sheet_containing(&needles)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use costgrid_engine::Sheet;

    fn wb(names: &[&str]) -> Workbook {
        Workbook::from_sheets(names.iter().map(|n| Sheet::new(n)).collect())
    }

    #[test]
    fn budget_patterns_in_priority_order() {
        let config = ExtractConfig::default();
        assert_eq!(find_budget_sheet(&wb(&["Budget", "Sources and Uses"]), &config), Some(1));
        assert_eq!(find_budget_sheet(&wb(&["Sources", "Sources Budget"]), &config), Some(1));
        assert_eq!(find_budget_sheet(&wb(&["Basis", "S&U"]), &config), Some(1));
        assert_eq!(find_budget_sheet(&wb(&["Dev Budget"]), &config), Some(0));
        assert_eq!(find_budget_sheet(&wb(&["Application", "Basis"]), &config), None);
    }

    #[test]
    fn sheet_names_are_case_sensitive() {
        let config = ExtractConfig::default();
        assert_eq!(find_budget_sheet(&wb(&["sources and uses"]), &config), None);
    }

    #[test]
    fn application_sheet_fallbacks() {
        let config = ExtractConfig::default();
        assert_eq!(find_application_sheet(&wb(&["Budget", "Application"]), &config), Some(1));
        assert_eq!(find_application_sheet(&wb(&["Budget", "App Form"]), &config), Some(1));
        assert_eq!(find_application_sheet(&wb(&["2025 Form", "Budget"]), &config), Some(0));
        assert_eq!(find_application_sheet(&wb(&["Form 1999", "Budget"]), &config), None);
        assert_eq!(find_application_sheet(&wb(&["Budget", "2025 Form"]), &config), None);
        assert_eq!(find_application_sheet(&Workbook::new(), &config), None);

        let mut strict = ExtractConfig::default();
        strict.sheets.year_named_application = false;
        assert_eq!(find_application_sheet(&wb(&["2025 Form"]), &strict), None);
    }

    #[test]
    fn area_order_puts_app_sheets_first_and_skips_budget_sheets() {
        let config = ExtractConfig::default();
        let book = wb(&["Checklist", "Sources and Uses", "Basis", "Application", "Cost Breakdown"]);
        assert_eq!(area_search_order(&book, &config), vec![3, 0, 2]);
    }
}
