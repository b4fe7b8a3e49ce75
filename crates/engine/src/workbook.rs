use crate::sheet::Sheet;

/// An ordered collection of named sheets loaded from one document.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Index of the first sheet whose name contains every needle (case-sensitive).
    pub fn find_sheet_containing(&self, needles: &[&str]) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| needles.iter().all(|n| s.name.contains(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wb(names: &[&str]) -> Workbook {
        Workbook::from_sheets(names.iter().map(|n| Sheet::new(n)).collect())
    }

    #[test]
    fn test_find_sheet_containing_requires_all_needles() {
        let wb = wb(&["Checklist", "Sources and Uses Budget", "Application"]);
        assert_eq!(wb.find_sheet_containing(&["Sources", "Uses"]), Some(1));
        assert_eq!(wb.find_sheet_containing(&["Application"]), Some(2));
        assert_eq!(wb.find_sheet_containing(&["Sources", "Basis"]), None);
    }

    #[test]
    fn test_sheet_lookup() {
        let wb = wb(&["A", "B"]);
        assert_eq!(wb.sheet_names(), vec!["A", "B"]);
        assert!(wb.sheet_by_name("B").is_some());
        assert!(wb.sheet_by_name("C").is_none());
        assert!(wb.sheet(2).is_none());
    }
}
