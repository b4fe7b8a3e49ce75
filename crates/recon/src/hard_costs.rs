//! Hard construction costs from the budget sheet.
//!
//! Tried in order: the total line under "New Construction", the total line
//! under "Rehabilitation", then the sum of the individual component lines.

use costgrid_engine::search::{find_matching_rows, row_text};
use costgrid_engine::section::largest_amount;
use costgrid_engine::{KeywordSpec, Sheet};
use once_cell::sync::Lazy;

use crate::config::ExtractConfig;
use crate::model::{HardCostSource, HardCosts};

static NEW_CONSTRUCTION: Lazy<KeywordSpec> = Lazy::new(|| KeywordSpec::any_of(&["new construction"]));
static REHABILITATION: Lazy<KeywordSpec> = Lazy::new(|| KeywordSpec::any_of(&["rehabilitation"]));

static COMPONENTS: Lazy<Vec<KeywordSpec>> = Lazy::new(|| {
    vec![
        KeywordSpec::any_of(&["site work", "sitework"]),
        KeywordSpec::any_of(&["structures"]),
        KeywordSpec::any_of(&["general requirements"]),
        KeywordSpec::any_of(&["contractor overhead", "contractor profit"]),
        KeywordSpec::any_of(&["prevailing wage"]),
    ]
});

pub fn compute_hard_costs(sheet: &Sheet, config: &ExtractConfig) -> HardCosts {
    let exclusions = [config.years.exclusion()];
    let min = config.money.min_line_item;
    let depth = config.hard_costs.scan_depth;

    let total_under = |anchors: &KeywordSpec| -> f64 {
        for anchor in find_matching_rows(sheet, anchors) {
            let last = anchor.saturating_add(depth).min(sheet.row_count().saturating_sub(1));
            let total_row = (anchor..=last).find(|&r| row_text(sheet, r).contains("total"));
            if let Some(row) = total_row {
                let amount = largest_amount(sheet.row(row), min, &exclusions);
                if amount != 0.0 {
                    return amount;
                }
            }
        }
        0.0
    };

    let amount = total_under(&NEW_CONSTRUCTION);
    if amount != 0.0 {
        return found(amount, HardCostSource::NewConstruction);
    }

    let amount = total_under(&REHABILITATION);
    if amount != 0.0 {
        return found(amount, HardCostSource::Rehab);
    }

    if config.hard_costs.component_fallback {
        let amount: f64 = COMPONENTS
            .iter()
            .filter_map(|spec| {
                find_matching_rows(sheet, spec)
                    .into_iter()
                    .find(|&r| !row_text(sheet, r).contains("total"))
            })
            .map(|row| largest_amount(sheet.row(row), min, &exclusions))
            .sum();
        if amount != 0.0 {
            return found(amount, HardCostSource::ComponentSum);
        }
    }

    tracing::debug!(sheet = %sheet.name, "no hard cost line found");
    HardCosts::missing()
}

fn found(amount: f64, source: HardCostSource) -> HardCosts {
    tracing::debug!(amount, %source, "hard costs located");
    HardCosts { amount, source }
}

/// Flag recorded for a hard-cost outcome; the primary source needs none.
pub fn source_flag(source: HardCostSource) -> Option<&'static str> {
    match source {
        HardCostSource::NewConstruction => None,
        HardCostSource::Rehab => Some("Hard Costs Source: Rehab"),
        HardCostSource::ComponentSum => Some("Hard Costs Source: Component Sum"),
        HardCostSource::Missing => Some("Hard Costs Missing"),
    }
}
