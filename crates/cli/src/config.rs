//! `costgrid` config file: extraction policy plus a `[fetch]` table.
//!
//! ```toml
//! [fetch]
//! listing_url = "https://example.org/applications/index.asp"
//! data_dir = "Downloaded files"
//!
//! [units]
//! min = 1
//! max = 5000
//! integral = false
//! ```

use std::path::{Path, PathBuf};

use costgrid_recon::ExtractConfig;
use serde::Deserialize;

use crate::CliError;

/// Application listing of the 2025 third-round 4% applications.
pub const DEFAULT_LISTING_URL: &str =
    "https://www.treasurer.ca.gov/ctcac/2025/thirdround/4percent/application/index.asp";
pub const DEFAULT_DATA_DIR: &str = "Downloaded files";
pub const DEFAULT_OUTPUT: &str = "summary_output.csv";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub extract: ExtractConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub listing_url: String,
    pub data_dir: PathBuf,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            timeout_secs: 60,
        }
    }
}

impl CliConfig {
    pub fn from_toml(input: &str) -> Result<Self, CliError> {
        let config: CliConfig = toml::from_str(input)
            .map_err(|e| CliError::config(format!("config parse error: {e}")))?;
        config.extract.validate().map_err(|e| CliError::config(e.to_string()))?;
        if config.fetch.timeout_secs == 0 {
            return Err(CliError::config(
                "config validation error: fetch.timeout_secs must be positive",
            ));
        }
        Ok(config)
    }

    /// Default config location: `<config_dir>/costgrid/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("costgrid")
            .join("config.toml")
    }

    /// Load `--config` if given (must exist), else the default location if
    /// present, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(CliError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|e| {
            CliError::config(format!("cannot read config {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&text)
            .map_err(|e| e.with_hint(format!("check {}", path.display())))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;

    #[test]
    fn empty_file_is_default() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config.fetch.listing_url, DEFAULT_LISTING_URL);
        assert_eq!(config.fetch.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.extract.units.max, 6000.0);
    }

    #[test]
    fn fetch_and_extract_tables_share_one_file() {
        let config = CliConfig::from_toml(
            r#"
[fetch]
listing_url = "http://localhost:9999/list.html"
data_dir = "books"

[units]
min = 1
max = 5000
integral = false

[money]
tolerance = 2.5
"#,
        )
        .unwrap();
        assert_eq!(config.fetch.listing_url, "http://localhost:9999/list.html");
        assert_eq!(config.fetch.data_dir, PathBuf::from("books"));
        assert_eq!(config.fetch.timeout_secs, 60);
        assert!(!config.extract.units.integral);
        assert_eq!(config.extract.money.tolerance, 2.5);
    }

    #[test]
    fn invalid_extract_policy_is_config_error() {
        let err = CliConfig::from_toml("[units]\nmin = 10\nmax = 1\n").unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
        assert!(err.message.contains("units"));
    }

    #[test]
    fn parse_error_is_config_error() {
        let err = CliConfig::from_toml("[fetch\n").unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
        assert!(err.message.starts_with("config parse error"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/costgrid.toml"))).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_CONFIG);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.toml");
        std::fs::write(&path, "[hard_costs]\nscan_depth = 5\n").unwrap();
        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.extract.hard_costs.scan_depth, 5);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = CliConfig::from_toml("[fetch]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.message.contains("timeout_secs"));
    }
}
