//! `costgrid fetch` - download every workbook linked from a listing page.
//!
//! The listing is fetched once; a failure there aborts with a fetch exit
//! code. Individual workbook downloads are best-effort: a failure is logged
//! and counted, and the remaining links are still tried. Files already
//! present in the data directory are never downloaded again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use costgrid_io::files::is_workbook_name;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::exit_codes;
use crate::CliError;

pub(crate) const USER_AGENT: &str = concat!("costgrid/", env!("CARGO_PKG_VERSION"));

static HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap());

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    /// Distinct workbook links on the listing page.
    pub found: usize,
    pub downloaded: usize,
    /// Already present locally.
    pub skipped: usize,
    pub failed: usize,
}

pub struct Fetcher {
    http: reqwest::blocking::Client,
    listing: Url,
    data_dir: PathBuf,
}

impl Fetcher {
    pub fn new(listing_url: &str, data_dir: &Path, timeout: Duration) -> Result<Self, CliError> {
        let listing = Url::parse(listing_url).map_err(|e| {
            CliError::args(format!("invalid listing URL '{listing_url}': {e}"))
                .with_hint("pass an absolute http(s) URL with --url or [fetch].listing_url")
        })?;

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self {
            http,
            listing,
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn run(&self) -> Result<FetchReport, CliError> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            CliError::io(format!("cannot create {}: {e}", self.data_dir.display()))
        })?;

        tracing::info!("Checking {}...", self.listing);
        let html = self.get_listing()?;
        let links = extract_links(&html, &self.listing);

        let mut report = FetchReport {
            found: links.len(),
            ..Default::default()
        };
        tracing::info!("Found {} files.", links.len());

        for (i, link) in links.iter().enumerate() {
            let n = i + 1;
            let name = match file_name_for(link) {
                Some(name) => name,
                None => {
                    tracing::warn!(url = %link, "cannot derive a file name, skipping");
                    report.failed += 1;
                    continue;
                }
            };
            let target = self.data_dir.join(&name);

            if target.exists() {
                tracing::info!("[{n}/{}] Skipping {name} (exists)", links.len());
                report.skipped += 1;
                continue;
            }

            tracing::info!("[{n}/{}] Downloading {name}...", links.len());
            match self.download(link, &target) {
                Ok(bytes) => {
                    tracing::debug!(file = %name, bytes, "downloaded");
                    report.downloaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Error downloading {name}: {e}");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    fn get_listing(&self) -> Result<String, CliError> {
        let resp = self.http.get(self.listing.clone()).send().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_CONNECT,
            message: format!("connection error: {e}"),
            hint: Some("check the listing URL and your network connection".into()),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CliError {
                code: exit_codes::EXIT_FETCH_STATUS,
                message: format!("listing page returned HTTP {}", status.as_u16()),
                hint: None,
            });
        }

        resp.text().map_err(|e| CliError {
            code: exit_codes::EXIT_FETCH_CONNECT,
            message: format!("failed to read listing page: {e}"),
            hint: None,
        })
    }

    /// Download to `<target>.part`, then rename, so an interrupted transfer
    /// never leaves a file that a later run would skip.
    fn download(&self, url: &Url, target: &Path) -> Result<usize, String> {
        let resp = self
            .http
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let bytes = resp.bytes().map_err(|e| e.to_string())?;

        let mut partial = target.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        std::fs::write(&partial, &bytes).map_err(|e| e.to_string())?;
        std::fs::rename(&partial, target).map_err(|e| {
            let _ = std::fs::remove_file(&partial);
            e.to_string()
        })?;
        Ok(bytes.len())
    }
}

/// Workbook links on a listing page, resolved against `base`, de-duplicated
/// in first-seen order.
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for cap in HREF.captures_iter(html) {
        let href = cap[1].trim();
        let Ok(url) = base.join(href) else {
            tracing::debug!(href, "unresolvable link");
            continue;
        };
        if !is_workbook_name(url.path()) {
            continue;
        }
        if seen.insert(url.as_str().to_string()) {
            links.push(url);
        }
    }

    links
}

/// Percent-decoded last path segment.
pub fn file_name_for(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let decoded = urlencoding::decode(segment).ok()?;
    let name = decoded.trim();
    // A decoded "%2F" must not escape the data directory.
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const LISTING: &str = r#"
<html><body>
  <a href="apps/25-401.xlsx">Maple Court</a>
  <a HREF='/ctcac/2025/apps/25-402%20Oak%20Terrace.XLSM'>Oak Terrace</a>
  <a href="apps/25-401.xlsx">Maple Court (duplicate)</a>
  <a href="apps/instructions.pdf">Instructions</a>
  <a href="https://cdn.example.org/25-403.xls">Pine Row</a>
  <a href="index.asp?page=2">Next</a>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://example.org/ctcac/2025/index.asp").unwrap()
    }

    // ── Link extraction ─────────────────────────────────────────────

    #[test]
    fn test_extract_links_resolves_and_dedups() {
        let links = extract_links(LISTING, &base());
        let urls: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://example.org/ctcac/2025/apps/25-401.xlsx",
                "https://example.org/ctcac/2025/apps/25-402%20Oak%20Terrace.XLSM",
                "https://cdn.example.org/25-403.xls",
            ]
        );
    }

    #[test]
    fn test_file_name_is_percent_decoded() {
        let url = Url::parse("https://example.org/a/25-402%20Oak%20Terrace.xlsm").unwrap();
        assert_eq!(file_name_for(&url).as_deref(), Some("25-402 Oak Terrace.xlsm"));
        let sneaky = Url::parse("https://example.org/a/..%2F..%2Fetc.xlsx").unwrap();
        assert_eq!(file_name_for(&sneaky), None);
    }

    // ── Downloads ───────────────────────────────────────────────────

    #[test]
    fn test_fetch_downloads_skips_and_survives_404() {
        let server = MockServer::start();

        let listing_mock = server.mock(|when, then| {
            when.method(GET).path("/apps/index.asp");
            then.status(200).header("content-type", "text/html").body(
                r#"<a href="a.xlsx">A</a> <a href="files/b%20two.xlsm">B</a>
                   <a href="missing.xls">C</a> <a href="kept.xlsx">D</a>"#,
            );
        });
        let a_mock = server.mock(|when, then| {
            when.method(GET).path("/apps/a.xlsx");
            then.status(200).body("AAAA");
        });
        let b_mock = server.mock(|when, then| {
            when.method(GET).path_includes("/apps/files/b").path_includes("two.xlsm");
            then.status(200).body("BB");
        });
        server.mock(|when, then| {
            when.method(GET).path("/apps/missing.xls");
            then.status(404);
        });
        let kept_mock = server.mock(|when, then| {
            when.method(GET).path("/apps/kept.xlsx");
            then.status(200).body("new");
        });

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kept.xlsx"), "old").unwrap();

        let fetcher =
            Fetcher::new(&server.url("/apps/index.asp"), dir.path(), Duration::from_secs(5)).unwrap();
        let report = fetcher.run().unwrap();

        listing_mock.assert();
        a_mock.assert();
        b_mock.assert();
        kept_mock.assert_calls(0);
        assert_eq!(
            report,
            FetchReport {
                found: 4,
                downloaded: 2,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("a.xlsx")).unwrap(), "AAAA");
        assert_eq!(std::fs::read_to_string(dir.path().join("b two.xlsm")).unwrap(), "BB");
        assert_eq!(std::fs::read_to_string(dir.path().join("kept.xlsx")).unwrap(), "old");
        assert!(!dir.path().join("missing.xls").exists());
        assert!(!dir.path().join("missing.xls.part").exists());
    }

    #[test]
    fn test_listing_status_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/index.asp");
            then.status(503);
        });

        let dir = tempfile::tempdir().unwrap();
        let fetcher =
            Fetcher::new(&server.url("/index.asp"), dir.path(), Duration::from_secs(5)).unwrap();
        let err = fetcher.run().unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_STATUS);
        assert!(err.message.contains("503"));
    }

    #[test]
    fn test_listing_connect_error() {
        let dir = tempfile::tempdir().unwrap();
        // Port 9 (discard) on localhost is not listening in test environments.
        let fetcher =
            Fetcher::new("http://127.0.0.1:9/index.asp", dir.path(), Duration::from_secs(2)).unwrap();
        let err = fetcher.run().unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_CONNECT);
    }

    #[test]
    fn test_invalid_listing_url() {
        let dir = tempfile::tempdir().unwrap();
        let err = Fetcher::new("not a url", dir.path(), Duration::from_secs(1))
            .err()
            .unwrap();
        assert_eq!(err.code, exit_codes::EXIT_USAGE);
    }
}
