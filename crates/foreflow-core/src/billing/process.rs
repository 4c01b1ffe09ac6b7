use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use foreflow_parser::read_clickup_export;
use tracing::info;

use super::archive::matching_files;
use super::report::{render_markdown, summarize};
use super::transform::{calculate_billing_amounts, process_clickup_export, write_cleaned_csv};
use super::{CLEANED_DIR, RAW_DIR, REPORTS_DIR};
use crate::config::BillingConfig;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub input: PathBuf,
    pub cleaned_csv: PathBuf,
    pub summary_report: PathBuf,
    pub records: usize,
    pub total_hours: f64,
    pub total_amount: f64,
}

/// The raw export with the greatest file name under `root/raw/clickup_billing/`.
///
/// Matches `*.csv` the same way the archiver does, so any export billed here
/// is one `archive_month` will move.
pub fn latest_export(root: &Path) -> Result<PathBuf> {
    let raw_dir = root.join(RAW_DIR);
    matching_files(&raw_dir, "*.csv")?
        .pop()
        .ok_or_else(|| no_exports(&raw_dir))
}

fn no_exports(raw_dir: &Path) -> PipelineError {
    PipelineError::NotFound(format!(
        "No CSV files found in {}. Place the ClickUp export CSV in {RAW_DIR}/",
        raw_dir.display()
    ))
}

/// Clean the newest raw export and write both outputs under `root`.
pub fn process_latest(
    root: &Path,
    config: &BillingConfig,
    generated_at: NaiveDateTime,
) -> Result<ProcessOutcome> {
    let input = latest_export(root)?;
    process_file(&input, root, config, generated_at)
}

pub fn process_file(
    input: &Path,
    root: &Path,
    config: &BillingConfig,
    generated_at: NaiveDateTime,
) -> Result<ProcessOutcome> {
    info!(input = %input.display(), "processing ClickUp export");
    let content = fs::read(input).map_err(|err| PipelineError::io(input, err))?;
    let raw = read_clickup_export(&content)?;

    let mut records = process_clickup_export(&raw, config)?;
    calculate_billing_amounts(&mut records, &config.billing_rates);

    let summary = summarize(&records, config)?;
    let (first, last) = (summary.first_date, summary.last_date);

    let cleaned_dir = root.join(CLEANED_DIR);
    let reports_dir = root.join(REPORTS_DIR);
    for dir in [&cleaned_dir, &reports_dir] {
        fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
    }

    let cleaned_csv = cleaned_dir.join(format!(
        "billing_report_{}_to_{}.csv",
        first.format("%Y-%m-%d"),
        last.format("%Y-%m-%d")
    ));
    write_cleaned_csv(&records, &cleaned_csv)?;

    let summary_report = reports_dir.join(format!("billing_summary_{}.md", first.format("%Y-%m")));
    fs::write(&summary_report, render_markdown(&summary, generated_at))
        .map_err(|err| PipelineError::io(&summary_report, err))?;
    info!(path = %summary_report.display(), "summary report written");

    Ok(ProcessOutcome {
        input: input.to_path_buf(),
        cleaned_csv,
        summary_report,
        records: records.len(),
        total_hours: summary.total_hours,
        total_amount: summary.total_amount,
    })
}
