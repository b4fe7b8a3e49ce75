use std::path::Path;

use costgrid_engine::proximity::{Exclusion, ValueRange};
use costgrid_engine::section::LedgerOptions;
use costgrid_engine::KeywordSpec;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Tunable extraction policy. Every table is optional; an empty file yields
/// [`ExtractConfig::default`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub units: UnitsConfig,
    pub area: AreaConfig,
    pub money: MoneyConfig,
    pub years: YearsConfig,
    pub artifacts: ArtifactsConfig,
    pub sheets: SheetsConfig,
    pub sections: SectionsConfig,
    pub hard_costs: HardCostsConfig,
}

// ---------------------------------------------------------------------------
// Units + area
// ---------------------------------------------------------------------------

/// Unit counts are whole numbers in `[5, 6000]` by default. Set
/// `min = 1, max = 5000, integral = false` for the looser policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UnitsConfig {
    pub min: f64,
    pub max: f64,
    pub integral: bool,
    /// Rows scanned below each anchor row.
    pub window: usize,
    /// Counts above zero but below this get a "Low Unit Count" flag.
    pub low_count_below: u32,
    pub keywords: KeywordSpec,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            min: 5.0,
            max: 6000.0,
            integral: true,
            window: 2,
            low_count_below: 5,
            keywords: KeywordSpec::new(&[
                &["total", "units"],
                &["total", "#", "units"],
                &["unit", "count"],
                &["total", "residential", "units"],
            ]),
        }
    }
}

impl UnitsConfig {
    pub fn range(&self) -> ValueRange {
        ValueRange { min: self.min, max: self.max, integral: self.integral }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AreaConfig {
    pub min: f64,
    pub max: f64,
    pub window: usize,
    pub keywords: KeywordSpec,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            min: 2000.0,
            max: 2_000_000.0,
            window: 0,
            keywords: KeywordSpec::any_of(&[
                "sq. ft.",
                "square footage",
                "net rentable",
                "gross building",
                "gba",
                "residential area",
            ]),
        }
    }
}

impl AreaConfig {
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Money, years, artifacts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MoneyConfig {
    /// Line-item amounts must exceed this magnitude.
    pub min_line_item: f64,
    /// Calculated vs. sheet totals may differ by this much without a flag.
    pub tolerance: f64,
}

impl Default for MoneyConfig {
    fn default() -> Self {
        Self {
            min_line_item: 100.0,
            tolerance: 1.0,
        }
    }
}

/// Calendar years treated as dates, never as amounts or counts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct YearsConfig {
    pub min: u32,
    pub max: u32,
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self { min: 2018, max: 2030 }
    }
}

impl YearsConfig {
    pub fn exclusion(&self) -> Exclusion {
        Exclusion::Range(self.min as f64, self.max as f64)
    }

    pub fn contains(&self, year: u32) -> bool {
        year >= self.min && year <= self.max
    }
}

/// Literal values that are form artifacts (question numbers) near anchors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub exact: Vec<f64>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self { exact: vec![9.0] }
    }
}

// ---------------------------------------------------------------------------
// Sheets + sections
// ---------------------------------------------------------------------------

/// Sheet-name patterns. Each pattern is a list of substrings that must all
/// appear in the name (case-sensitive); patterns are tried in order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub budget: Vec<Vec<String>>,
    pub application: Vec<Vec<String>>,
    /// Fall back to the first sheet when its name holds a year in `[years]`.
    pub year_named_application: bool,
    /// Sheets whose names contain any of these are not searched for area.
    pub area_skip: Vec<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            budget: patterns(&[&["Sources", "Uses"], &["Sources", "Budget"], &["S&U"], &["Budget"]]),
            application: patterns(&[&["Application"], &["App"]]),
            year_named_application: true,
            area_skip: ["Source", "Budget", "Cost", "Financ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn patterns(p: &[&[&str]]) -> Vec<Vec<String>> {
    p.iter()
        .map(|g| g.iter().map(|s| s.to_string()).collect())
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionMarkers {
    pub start: KeywordSpec,
    pub end: KeywordSpec,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SectionsConfig {
    pub construction: SectionMarkers,
    pub permanent: SectionMarkers,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            construction: SectionMarkers {
                start: KeywordSpec::new(&[&["construction interest", "fees"]]),
                end: KeywordSpec::new(&[&["total construction interest"]]),
            },
            permanent: SectionMarkers {
                start: KeywordSpec::new(&[&["permanent financing"]]),
                end: KeywordSpec::new(&[&["total permanent financing"]]),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HardCostsConfig {
    /// Rows scanned below a "New Construction"/"Rehabilitation" header for
    /// its total line.
    pub scan_depth: usize,
    /// Sum site work, structures, etc. when no total line is found.
    pub component_fallback: bool,
}

impl Default for HardCostsConfig {
    fn default() -> Self {
        Self {
            scan_depth: 20,
            component_fallback: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ExtractConfig {
    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let config: ExtractConfig =
            toml::from_str(input).map_err(|e| ExtractError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ExtractError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExtractError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        check_range("units", self.units.min, self.units.max)?;
        check_range("area", self.area.min, self.area.max)?;

        if self.years.min > self.years.max {
            return Err(ExtractError::ConfigValidation(format!(
                "years: min {} exceeds max {}",
                self.years.min, self.years.max
            )));
        }

        if !(self.money.tolerance >= 0.0) {
            return Err(ExtractError::ConfigValidation(format!(
                "money.tolerance must be non-negative, got {}",
                self.money.tolerance
            )));
        }
        if !(self.money.min_line_item >= 0.0) {
            return Err(ExtractError::ConfigValidation(format!(
                "money.min_line_item must be non-negative, got {}",
                self.money.min_line_item
            )));
        }

        for (name, spec) in [
            ("units.keywords", &self.units.keywords),
            ("area.keywords", &self.area.keywords),
            ("sections.construction.start", &self.sections.construction.start),
            ("sections.construction.end", &self.sections.construction.end),
            ("sections.permanent.start", &self.sections.permanent.start),
            ("sections.permanent.end", &self.sections.permanent.end),
        ] {
            if spec.is_empty() {
                return Err(ExtractError::ConfigValidation(format!(
                    "{name} must contain at least one keyword group"
                )));
            }
        }

        if self.sheets.budget.iter().chain(&self.sheets.application).any(|p| p.is_empty()) {
            return Err(ExtractError::ConfigValidation(
                "sheet name patterns must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Artifact literals plus the calendar-year band.
    pub fn exclusions(&self) -> Vec<Exclusion> {
        let mut out: Vec<Exclusion> = self.artifacts.exact.iter().map(|&v| Exclusion::Exact(v)).collect();
        out.push(self.years.exclusion());
        out
    }

    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            min_magnitude: self.money.min_line_item,
            exclusions: vec![self.years.exclusion()],
        }
    }
}

fn check_range(name: &str, min: f64, max: f64) -> Result<(), ExtractError> {
    if !(min <= max) {
        return Err(ExtractError::ConfigValidation(format!(
            "{name}: min {min} exceeds max {max}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config = ExtractConfig::from_toml("").unwrap();
        assert_eq!(config.units.min, 5.0);
        assert_eq!(config.units.max, 6000.0);
        assert!(config.units.integral);
        assert_eq!(config.units.window, 2);
        assert_eq!(config.money.tolerance, 1.0);
        assert_eq!(config.years.min, 2018);
        assert_eq!(config.hard_costs.scan_depth, 20);
    }

    #[test]
    fn loose_unit_policy() {
        let config = ExtractConfig::from_toml(
            r#"
[units]
min = 1
max = 5000
integral = false
"#,
        )
        .unwrap();
        let range = config.units.range();
        assert!(range.contains(2.5));
        assert!(!range.contains(5001.0));
        // Untouched fields keep their defaults.
        assert_eq!(config.units.window, 2);
        assert!(!config.units.keywords.is_empty());
    }

    #[test]
    fn keyword_specs_from_toml() {
        let config = ExtractConfig::from_toml(
            r#"
[sections.permanent]
start = [["Perm", "LOAN"]]
end = [["total perm"], ["perm", "subtotal"]]
"#,
        )
        .unwrap();
        assert!(config.sections.permanent.end.matches("total perm"));
        assert!(config.sections.permanent.end.matches("perm loan subtotal"));
        assert!(config.sections.permanent.start.matches("perm loan fees"));
        // Construction markers keep their defaults.
        assert!(config.sections.construction.end.matches("total construction interest & fees"));
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ExtractConfig::from_toml("[area]\nmin = 10\nmax = 1\n").unwrap_err();
        assert!(matches!(err, ExtractError::ConfigValidation(_)));
        assert!(err.to_string().contains("area"));
    }

    #[test]
    fn rejects_negative_tolerance() {
        let err = ExtractConfig::from_toml("[money]\ntolerance = -1.0\n").unwrap_err();
        assert!(matches!(err, ExtractError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_empty_keywords() {
        let err = ExtractConfig::from_toml("[units]\nkeywords = []\n").unwrap_err();
        assert!(err.to_string().contains("units.keywords"));
    }

    #[test]
    fn parse_error_is_reported() {
        let err = ExtractConfig::from_toml("[units\nmin = 1").unwrap_err();
        assert!(matches!(err, ExtractError::ConfigParse(_)));
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = ExtractConfig::from_file(Path::new("/nonexistent/costgrid.toml")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costgrid.toml");
        std::fs::write(&path, "[money]\ntolerance = 5.0\n").unwrap();
        let config = ExtractConfig::from_file(&path).unwrap();
        assert_eq!(config.money.tolerance, 5.0);
    }

    #[test]
    fn exclusions_include_artifacts_and_years() {
        let config = ExtractConfig::default();
        let ex = config.exclusions();
        assert!(ex.iter().any(|e| e.excludes(9.0)));
        assert!(ex.iter().any(|e| e.excludes(2025.0)));
        assert!(!ex.iter().any(|e| e.excludes(240.0)));
    }
}
