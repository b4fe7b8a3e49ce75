// costgrid CLI - fetch tax-credit application workbooks and extract their
// financing costs into one summary CSV

mod batch;
mod config;
mod exit_codes;
mod fetch;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use costgrid_io::{list_workbooks, write_summary};
use costgrid_recon::model::{DocumentRecord, SectionCosts};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{CliConfig, DEFAULT_OUTPUT};
use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use fetch::{FetchReport, Fetcher};

#[derive(Parser)]
#[command(name = "costgrid")]
#[command(about = "Extract and reconcile financing costs from housing tax-credit application workbooks")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
struct Cli {
    /// Config file (TOML). Defaults to <config dir>/costgrid/config.toml when present.
    #[arg(long, global = true, env = "COSTGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "costgrid_recon=debug". Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every workbook linked from the listing page
    #[command(after_help = "\
Examples:
  costgrid fetch
  costgrid fetch --url https://example.org/apps/index.asp --dir books")]
    Fetch {
        /// Listing page URL (default: [fetch].listing_url)
        #[arg(long)]
        url: Option<String>,

        /// Download directory (default: [fetch].data_dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Process every workbook in a directory into the summary CSV
    #[command(after_help = "\
Examples:
  costgrid extract
  costgrid extract --dir books -o summary.csv --jobs 8
  costgrid extract -o - | head")]
    Extract {
        /// Directory of workbooks (default: [fetch].data_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Output CSV path, or "-" for stdout
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
        output: String,

        /// Worker threads; 1 processes files sequentially
        #[arg(long, short = 'j', default_value_t = 1)]
        jobs: usize,
    },

    /// Fetch, then extract
    Run {
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
        output: String,

        #[arg(long, short = 'j', default_value_t = 1)]
        jobs: usize,
    },

    /// Process one workbook and print its record
    Inspect {
        /// Workbook file
        file: PathBuf,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level.as_deref(), cli.quiet) {
        return report(e);
    }

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Fetch { url, dir } => cmd_fetch(&config, url, dir).map(|_| ()),
        Commands::Extract { dir, output, jobs } => cmd_extract(&config, dir, &output, jobs, cli.quiet),
        Commands::Run { url, dir, output, jobs } => cmd_run(&config, url, dir, &output, jobs, cli.quiet),
        Commands::Inspect { file, json } => cmd_inspect(&config, &file, json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => report(e),
    }
}

fn report(CliError { code, message, hint }: CliError) -> ExitCode {
    if !message.is_empty() {
        eprintln!("error: {}", message);
    }
    if let Some(hint) = hint {
        eprintln!("hint:  {}", hint);
    }
    ExitCode::from(code)
}

fn init_logging(level: Option<&str>, quiet: bool) -> Result<(), CliError> {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| CliError::args(format!("invalid --log-level '{directives}': {e}")))?,
        None if quiet => EnvFilter::new("warn"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// fetch
// ============================================================================

fn cmd_fetch(config: &CliConfig, url: Option<String>, dir: Option<PathBuf>) -> Result<FetchReport, CliError> {
    let url = url.unwrap_or_else(|| config.fetch.listing_url.clone());
    let dir = dir.unwrap_or_else(|| config.fetch.data_dir.clone());

    let fetcher = Fetcher::new(&url, &dir, Duration::from_secs(config.fetch.timeout_secs))?;
    let report = fetcher.run()?;

    tracing::info!(
        found = report.found,
        downloaded = report.downloaded,
        skipped = report.skipped,
        failed = report.failed,
        "fetch complete"
    );
    Ok(report)
}

// ============================================================================
// extract
// ============================================================================

fn cmd_extract(
    config: &CliConfig,
    dir: Option<PathBuf>,
    output: &str,
    jobs: usize,
    quiet: bool,
) -> Result<(), CliError> {
    if jobs == 0 {
        return Err(CliError::args("--jobs must be at least 1"));
    }
    let dir = dir.unwrap_or_else(|| config.fetch.data_dir.clone());
    if !dir.is_dir() {
        return Err(CliError::io(format!("No data directory found: {}", dir.display()))
            .with_hint("run `costgrid fetch` first or pass --dir"));
    }

    let files = list_workbooks(&dir).map_err(|e| CliError::io(e.to_string()))?;
    tracing::info!("Processing files in {}...", dir.display());
    tracing::info!("Found {} files.", files.len());

    let records = batch::process_all(&files, &config.extract, jobs)?;

    let fingerprint = if output == "-" {
        let stdout = io::stdout();
        write_summary(&records, stdout.lock()).map_err(|e| CliError::io(e.to_string()))?
    } else {
        let file = std::fs::File::create(output)
            .map_err(|e| CliError::io(format!("cannot create {output}: {e}")))?;
        write_summary(&records, io::BufWriter::new(file)).map_err(|e| CliError::io(e.to_string()))?
    };

    if !quiet {
        let target = if output == "-" { "stdout" } else { output };
        eprintln!("Done. Saved {} rows to {}", records.len(), target);
        eprintln!("fingerprint: {}", fingerprint);
    }
    Ok(())
}

fn cmd_run(
    config: &CliConfig,
    url: Option<String>,
    dir: Option<PathBuf>,
    output: &str,
    jobs: usize,
    quiet: bool,
) -> Result<(), CliError> {
    let dir = dir.unwrap_or_else(|| config.fetch.data_dir.clone());
    cmd_fetch(config, url, Some(dir.clone()))?;
    cmd_extract(config, Some(dir), output, jobs, quiet)
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(config: &CliConfig, file: &Path, json: bool) -> Result<(), CliError> {
    if !file.is_file() {
        return Err(CliError::args(format!("file not found: {}", file.display())));
    }

    let record = batch::process_file(file, &config.extract);

    let mut out = io::stdout().lock();
    let written = if json {
        let text = serde_json::to_string_pretty(&record)
            .map_err(|e| CliError::io(format!("cannot serialize record: {e}")))?;
        writeln!(out, "{}", text)
    } else {
        write_record_summary(&mut out, &record)
    };
    written.map_err(|e| CliError::io(e.to_string()))
}

fn write_record_summary(out: &mut impl Write, r: &DocumentRecord) -> io::Result<()> {
    writeln!(out, "File:             {}", r.file_name)?;
    if r.failed {
        writeln!(out, "Flags:            {}", r.flags.joined())?;
        return Ok(());
    }
    writeln!(out, "Application tab:  {}", r.application_sheet.as_deref().unwrap_or("-"))?;
    writeln!(out, "Budget tab:       {}", r.budget_sheet.as_deref().unwrap_or("-"))?;
    writeln!(out, "Total units:      {}", r.total_units)?;
    writeln!(out, "Total SF:         {}", r.total_sf)?;
    writeln!(out, "Hard costs:       {} ({})", r.hard_costs.amount, r.hard_costs.source)?;
    write_section(out, "Construction", &r.construction)?;
    write_section(out, "Permanent", &r.permanent)?;
    writeln!(out, "Combined:         {}", r.combined_financing)?;
    writeln!(out, "Per unit:         {:.2}", r.cost_per_unit)?;
    writeln!(out, "Per SF:           {:.2}", r.cost_per_sf)?;
    writeln!(out, "% of hard costs:  {:.2}", r.pct_of_hard_costs)?;
    let flags = if r.flags.is_empty() { "-".to_string() } else { r.flags.joined() };
    writeln!(out, "Flags:            {}", flags)
}

fn write_section(out: &mut impl Write, title: &str, s: &SectionCosts) -> io::Result<()> {
    writeln!(
        out,
        "{:<18}calculated {}, sheet {}",
        format!("{title}:"),
        s.calculated_total,
        s.sheet_total
    )?;
    for (category, amount) in &s.amounts {
        writeln!(out, "  {:<22}{}", category.to_string(), amount)?;
    }
    if s.other_costs != 0.0 || !s.other_details.is_empty() {
        writeln!(out, "  {:<22}{} ({})", "Other", s.other_costs, s.other_details_joined())?;
    }
    Ok(())
}
