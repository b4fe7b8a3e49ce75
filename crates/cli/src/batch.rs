//! Run the record pipeline over a directory of workbooks.
//!
//! Every input yields exactly one record; a workbook that cannot be read
//! becomes a record with an `Error: …` flag. Records come back sorted by
//! file name whatever the job count, so output is reproducible.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use costgrid_io::load_workbook;
use costgrid_recon::{build_record, failed_record, DocumentRecord, ExtractConfig};
use rayon::prelude::*;

use crate::CliError;

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load and extract one workbook. Never fails.
pub fn process_file(path: &Path, config: &ExtractConfig) -> DocumentRecord {
    let name = display_name(path);

    // calamine can panic on malformed archives; keep that inside this document.
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        load_workbook(path).map(|wb| build_record(&name, &wb, config))
    }));

    let record = match outcome {
        Ok(Ok(record)) => record,
        Ok(Err(e)) => failed_record(&name, &e),
        Err(_) => failed_record(&name, &"workbook reader panicked"),
    };

    if record.failed {
        tracing::warn!(file = %name, flag = %record.flags.joined(), "workbook could not be read");
    }
    record
}

/// Process `files` with `jobs` workers (1 = sequential).
pub fn process_all(
    files: &[PathBuf],
    config: &ExtractConfig,
    jobs: usize,
) -> Result<Vec<DocumentRecord>, CliError> {
    let total = files.len();
    let counter = AtomicUsize::new(0);
    let run_one = |path: &PathBuf| {
        let i = counter.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!("[{i}/{total}] Processing {}...", display_name(path));
        process_file(path, config)
    };

    let mut records: Vec<DocumentRecord> = if jobs <= 1 {
        files.iter().map(run_one).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| CliError::args(format!("cannot start {jobs} workers: {e}")))?;
        pool.install(|| files.par_iter().map(run_one).collect())
    };

    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(records)
}
