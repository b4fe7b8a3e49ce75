use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Extensions treated as workbooks (compared case-insensitively).
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

pub fn is_workbook_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    WORKBOOK_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// Workbooks directly inside `dir`, sorted by file name.
///
/// Not recursive. Excel lock files (`~$name.xlsx`) are skipped.
pub fn list_workbooks(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io(format!("{}: {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LoadError::Io(e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("~$") || !is_workbook_name(&name) {
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
