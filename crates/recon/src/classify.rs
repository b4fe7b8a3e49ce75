use costgrid_engine::normalize::normalize_label;
use costgrid_engine::section::{is_generic_label, SectionLedger};

use crate::model::{CostCategory, SectionCosts, SectionKind};

/// One taxonomy rule: a lowercase substring of the line-item label.
#[derive(Debug, Clone, Copy)]
pub struct CostRule {
    pub pattern: &'static str,
    pub category: CostCategory,
}

const fn rule(pattern: &'static str, category: CostCategory) -> CostRule {
    CostRule { pattern, category }
}

/// Construction interest & fees. Evaluated top to bottom, first match wins.
pub const CONSTRUCTION_RULES: &[CostRule] = &[
    rule("construction loan interest", CostCategory::LoanInterest),
    rule("loan interest", CostCategory::LoanInterest),
    rule("origination fee", CostCategory::OriginationFee),
    rule("credit enhancement", CostCategory::CreditEnhancement),
    rule("bond premium", CostCategory::BondPremium),
    rule("cost of issuance", CostCategory::CostOfIssuance),
    rule("title & recording", CostCategory::TitleRecording),
    rule("title and recording", CostCategory::TitleRecording),
    rule("taxes", CostCategory::Taxes),
    rule("insurance", CostCategory::Insurance),
];

/// Permanent financing. "loan origination fee" must precede the bare
/// "origination fee".
pub const PERMANENT_RULES: &[CostRule] = &[
    rule("loan origination fee", CostCategory::LoanOriginationFee),
    rule("origination fee", CostCategory::LoanOriginationFee),
    rule("credit enhancement", CostCategory::CreditEnhancement),
    rule("title & recording", CostCategory::TitleRecording),
    rule("title and recording", CostCategory::TitleRecording),
    rule("taxes", CostCategory::Taxes),
    rule("insurance", CostCategory::Insurance),
];

pub fn rules_for(kind: SectionKind) -> &'static [CostRule] {
    match kind {
        SectionKind::Construction => CONSTRUCTION_RULES,
        SectionKind::Permanent => PERMANENT_RULES,
    }
}

/// Category of the first rule whose pattern occurs in `label`.
pub fn classify_label(rules: &[CostRule], label: &str) -> Option<CostCategory> {
    let lower = label.to_lowercase();
    rules
        .iter()
        .find(|r| lower.contains(r.pattern))
        .map(|r| r.category)
}

/// Sort a section's line items into the taxonomy.
///
/// Amounts are additive per category. Unmatched items go to "other", with
/// their cleaned label kept as a description.
pub fn classify_section(kind: SectionKind, ledger: &SectionLedger) -> SectionCosts {
    let rules = rules_for(kind);
    let mut costs = SectionCosts::empty(kind);
    costs.located = ledger.found();
    costs.sheet_total = ledger.reported_total;

    for item in &ledger.items {
        match classify_label(rules, &item.label) {
            Some(category) => {
                *costs.amounts.entry(category).or_insert(0.0) += item.amount;
            }
            None => {
                costs.other_costs += item.amount;
                let desc = if is_generic_label(&item.label) {
                    item.label.clone()
                } else {
                    normalize_label(&item.label)
                };
                if !desc.is_empty() {
                    costs.other_details.push(desc);
                }
            }
        }
    }

    costs.calculated_total = costs.amounts.values().sum::<f64>() + costs.other_costs;

    tracing::debug!(
        section = %kind,
        classified = costs.amounts.len(),
        other = costs.other_details.len(),
        calculated = costs.calculated_total,
        "section classified"
    );

    costs
}

#[cfg(test)]
mod tests {
    use super::*;
    use costgrid_engine::section::{extract_section, LedgerOptions, LineItem};
    use costgrid_engine::sheet::sheet_from_strs;
    use costgrid_engine::KeywordSpec;

    fn ledger(items: &[(&str, f64)], reported: f64) -> SectionLedger {
        SectionLedger {
            start_row: Some(0),
            end_row: Some(items.len() + 1),
            items: items
                .iter()
                .enumerate()
                .map(|(i, (label, amount))| LineItem {
                    row: i + 1,
                    label: label.to_string(),
                    amount: *amount,
                })
                .collect(),
            reported_total: reported,
        }
    }

    #[test]
    fn loan_origination_fee_checked_before_origination_fee() {
        assert_eq!(
            classify_label(PERMANENT_RULES, "Loan Origination Fee"),
            Some(CostCategory::LoanOriginationFee)
        );
        assert_eq!(
            classify_label(CONSTRUCTION_RULES, "Construction Loan Interest"),
            Some(CostCategory::LoanInterest)
        );
        assert_eq!(classify_label(CONSTRUCTION_RULES, "Appraisal"), None);
    }

    #[test]
    fn construction_taxonomy() {
        let l = ledger(
            &[
                ("Construction Loan Interest", 400_000.0),
                ("Origination Fee", 30_000.0),
                ("Credit Enhancement", 5_000.0),
                ("Bond Premium", 2_000.0),
                ("Cost of Issuance", 90_000.0),
                ("Title & Recording", 15_000.0),
                ("Taxes", 12_000.0),
                ("Insurance", 40_000.0),
            ],
            594_000.0,
        );
        let costs = classify_section(SectionKind::Construction, &l);
        assert!(costs.located);
        assert_eq!(costs.amount(CostCategory::LoanInterest), 400_000.0);
        assert_eq!(costs.amount(CostCategory::CostOfIssuance), 90_000.0);
        assert_eq!(costs.amount(CostCategory::TitleRecording), 15_000.0);
        assert_eq!(costs.other_costs, 0.0);
        assert_eq!(costs.calculated_total, 594_000.0);
        assert_eq!(costs.sheet_total, 594_000.0);
    }

    #[test]
    fn repeated_categories_accumulate() {
        let l = ledger(&[("Insurance", 1_000.0), ("Insurance 2", 1_200.0)], 2_200.0);
        let costs = classify_section(SectionKind::Permanent, &l);
        assert_eq!(costs.amount(CostCategory::Insurance), 2_200.0);
        assert_eq!(costs.calculated_total, 2_200.0);
    }

    #[test]
    fn unmatched_items_go_to_other() {
        let l = ledger(
            &[
                ("Taxes", 500.0),
                ("Other: Lender Legal (Perm)", 2_500.0),
                ("Appraisal", 4_000.0),
                ("Other Cost", 300.0),
            ],
            7_300.0,
        );
        let costs = classify_section(SectionKind::Permanent, &l);
        assert_eq!(costs.amount(CostCategory::Taxes), 500.0);
        assert_eq!(costs.other_costs, 6_800.0);
        assert_eq!(costs.other_details_joined(), "Lender Legal Perm; Appraisal; Other Cost");
        assert_eq!(costs.calculated_total, 7_300.0);
    }

    #[test]
    fn unlabeled_rows_keep_generic_details() {
        let sheet = sheet_from_strs(
            "S&U",
            &[
                &["PERMANENT FINANCING"],
                &["", "", "1,000"],
                &["xy", "", "2,000"],
                &["Total Permanent Financing", "", "3,000"],
            ],
        );
        let l = extract_section(
            &sheet,
            &KeywordSpec::new(&[&["permanent financing"]]),
            &KeywordSpec::new(&[&["total permanent"]]),
            &LedgerOptions::default(),
        );
        let costs = classify_section(SectionKind::Permanent, &l);
        assert_eq!(costs.other_costs, 3_000.0);
        assert_eq!(costs.other_details_joined(), "Other Cost; Other Cost 2");
    }

    #[test]
    fn bond_premium_is_construction_only() {
        let l = ledger(&[("Bond Premium", 2_000.0)], 2_000.0);
        let costs = classify_section(SectionKind::Permanent, &l);
        assert_eq!(costs.amount(CostCategory::BondPremium), 0.0);
        assert_eq!(costs.other_costs, 2_000.0);
    }

    #[test]
    fn missing_section_is_unlocated() {
        let costs = classify_section(SectionKind::Construction, &SectionLedger::default());
        assert!(!costs.located);
        assert_eq!(costs.calculated_total, 0.0);
    }
}
