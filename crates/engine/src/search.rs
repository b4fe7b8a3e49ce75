//! Keyword search over sheet rows.
//!
//! A row's searchable text is every non-blank cell, stringified and
//! lowercased, joined by single spaces. A [`KeywordSpec`] matches a row when
//! any of its groups matches, and a group matches when all of its keywords are
//! substrings of that text.

use serde::{Deserialize, Serialize};

use crate::sheet::Sheet;

/// Keywords that must all appear in a row (AND). Stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordGroup(Vec<String>);

impl From<Vec<String>> for KeywordGroup {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(&keywords)
    }
}

impl From<KeywordGroup> for Vec<String> {
    fn from(group: KeywordGroup) -> Self {
        group.0
    }
}

impl KeywordGroup {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self(keywords.iter().map(|k| k.as_ref().to_lowercase()).collect())
    }

    /// `text` must already be lowercase.
    pub fn matches(&self, text: &str) -> bool {
        !self.0.is_empty() && self.0.iter().all(|k| text.contains(k.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }
}

/// Alternative keyword groups (OR).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSpec(Vec<KeywordGroup>);

impl KeywordSpec {
    /// `KeywordSpec::new(&[&["total", "units"], &["unit", "count"]])`
    pub fn new(groups: &[&[&str]]) -> Self {
        Self(groups.iter().map(|g| KeywordGroup::new(*g)).collect())
    }

    /// One single-keyword group per entry: matches if any keyword is present.
    pub fn any_of(keywords: &[&str]) -> Self {
        Self(keywords.iter().map(|k| KeywordGroup::new(&[*k])).collect())
    }

    /// `text` must already be lowercase.
    pub fn matches(&self, text: &str) -> bool {
        self.0.iter().any(|g| g.matches(text))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lowercased, space-joined text of one row.
pub fn row_text(sheet: &Sheet, row: usize) -> String {
    let parts: Vec<String> = sheet
        .row(row)
        .iter()
        .filter(|c| !c.is_blank())
        .map(|c| c.raw_display().to_lowercase())
        .collect();
    parts.join(" ")
}

/// Ascending indices of every row matching `spec`.
pub fn find_matching_rows(sheet: &Sheet, spec: &KeywordSpec) -> Vec<usize> {
    if spec.is_empty() {
        return Vec::new();
    }
    (0..sheet.row_count())
        .filter(|&row| spec.matches(&row_text(sheet, row)))
        .collect()
}

/// First matching row, if any.
pub fn find_first_row(sheet: &Sheet, spec: &KeywordSpec) -> Option<usize> {
    if spec.is_empty() {
        return None;
    }
    (0..sheet.row_count()).find(|&row| spec.matches(&row_text(sheet, row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::sheet::{sheet_from_strs, Sheet};

    fn sample() -> Sheet {
        sheet_from_strs(
            "Application",
            &[
                &["Project Name", "Sunrise Apartments"],
                &["Total", "", "Acres"],
                &["Units", "per floor"],
                &["", ""],
                &["Question 9"],
                &["  TOTAL number of  ", "", "UNITS:", "120"],
                &["Unit count pending"],
            ],
        )
    }

    #[test]
    fn test_and_within_group() {
        let rows = find_matching_rows(&sample(), &KeywordSpec::new(&[&["total", "units"]]));
        assert_eq!(rows, vec![5]);
    }

    #[test]
    fn test_or_across_groups_ascending() {
        let spec = KeywordSpec::new(&[&["unit", "count"], &["total", "units"]]);
        assert_eq!(find_matching_rows(&sample(), &spec), vec![5, 6]);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let spec = KeywordSpec::new(&[&["TOTAL", "Units"]]);
        assert_eq!(find_first_row(&sample(), &spec), Some(5));
    }

    #[test]
    fn test_numbers_are_searchable() {
        let sheet = Sheet::from_rows(
            "S",
            vec![vec![Cell::Text("Year".into()), Cell::Number(2025.0)]],
        );
        let rows = find_matching_rows(&sheet, &KeywordSpec::new(&[&["year", "2025"]]));
        assert_eq!(rows, vec![0]);
        assert_eq!(row_text(&sheet, 0), "year 2025");
    }

    #[test]
    fn test_any_of() {
        let spec = KeywordSpec::any_of(&["acres", "per floor"]);
        assert_eq!(find_matching_rows(&sample(), &spec), vec![1, 2]);
    }

    #[test]
    fn test_empty_spec_matches_nothing() {
        assert!(find_matching_rows(&sample(), &KeywordSpec::default()).is_empty());
        assert!(!KeywordGroup::new::<&str>(&[]).matches("anything"));
    }
}
