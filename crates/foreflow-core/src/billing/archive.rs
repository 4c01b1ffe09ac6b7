use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{info, warn};

use super::{CLEANED_DIR, OUTPUT_ARCHIVE_DIR, RAW_ARCHIVE_DIR, RAW_DIR, REPORTS_DIR};
use crate::error::{PipelineError, Result};

pub const MIN_YEAR: i32 = 2020;
pub const MAX_YEAR: i32 = 2100;

/// What a month archive moved, and what it expected but did not find.
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// `YYYY-MM`
    pub archive_name: String,
    pub raw_archive_dir: PathBuf,
    pub output_archive_dir: PathBuf,
    /// Human-readable labels, e.g. `Raw CSV: export.csv`.
    pub archived: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn validate_period(year: i32, month: u32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(PipelineError::Validation(format!(
            "Year must be between {MIN_YEAR} and {MAX_YEAR}"
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(PipelineError::Validation(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    Ok(())
}

/// Files in `dir` whose names match `file_pattern`, sorted by path.
/// A missing `dir` yields no files.
pub(crate) fn matching_files(dir: &Path, file_pattern: &str) -> Result<Vec<PathBuf>> {
    let dir_text = dir.to_string_lossy();
    let full = format!("{}/{}", Pattern::escape(&dir_text), file_pattern);
    let entries = glob::glob(&full)
        .map_err(|err| PipelineError::Config(format!("invalid file pattern '{full}': {err}")))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            PipelineError::io(path, std::io::Error::from(err))
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn move_into(file: &Path, dest_dir: &Path) -> Result<String> {
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dest = dest_dir.join(&name);
    if fs::rename(file, &dest).is_err() {
        // rename fails across filesystems
        fs::copy(file, &dest).map_err(|err| PipelineError::io(&dest, err))?;
        fs::remove_file(file).map_err(|err| PipelineError::io(file, err))?;
    }
    info!(file = %name, dest = %dest_dir.display(), "archived");
    Ok(name)
}

fn move_group(
    files: &[PathBuf],
    dest_dir: &Path,
    label: &str,
    report: &mut ArchiveReport,
) -> Result<()> {
    for file in files {
        let name = move_into(file, dest_dir)?;
        report.archived.push(format!("{label}: {name}"));
    }
    Ok(())
}

/// Move one month's raw exports and generated outputs into
/// `archive/YYYY-MM/` folders under `root`.
///
/// Every raw CSV is moved regardless of month. Missing groups are reported as
/// warnings; a missing PDF is not reported at all.
pub fn archive_month(root: &Path, year: i32, month: u32) -> Result<ArchiveReport> {
    validate_period(year, month)?;

    let archive_name = format!("{year:04}-{month:02}");
    let raw_archive_dir = root.join(RAW_ARCHIVE_DIR).join(&archive_name);
    let output_archive_dir = root.join(OUTPUT_ARCHIVE_DIR).join(&archive_name);
    for dir in [&raw_archive_dir, &output_archive_dir] {
        fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
    }

    let mut report = ArchiveReport {
        archive_name: archive_name.clone(),
        raw_archive_dir: raw_archive_dir.clone(),
        output_archive_dir: output_archive_dir.clone(),
        ..Default::default()
    };

    let raw_files = matching_files(&root.join(RAW_DIR), "*.csv")?;
    if raw_files.is_empty() {
        report
            .warnings
            .push(format!("No CSV files found in {RAW_DIR}/"));
    }
    move_group(&raw_files, &raw_archive_dir, "Raw CSV", &mut report)?;

    let cleaned_pattern = format!("billing_report_{archive_name}-*.csv");
    let cleaned_files = matching_files(&root.join(CLEANED_DIR), &cleaned_pattern)?;
    if cleaned_files.is_empty() {
        report
            .warnings
            .push(format!("No cleaned CSV found matching: {cleaned_pattern}"));
    }
    move_group(&cleaned_files, &output_archive_dir, "Cleaned CSV", &mut report)?;

    let reports_dir = root.join(REPORTS_DIR);
    let summary_pattern = format!("billing_summary_{archive_name}.md");
    let summary_files = matching_files(&reports_dir, &summary_pattern)?;
    if summary_files.is_empty() {
        report
            .warnings
            .push(format!("No summary report found matching: {summary_pattern}"));
    }
    move_group(&summary_files, &output_archive_dir, "Summary report", &mut report)?;

    let pdf_files = matching_files(&reports_dir, &format!("billing_summary_{archive_name}.pdf"))?;
    move_group(&pdf_files, &output_archive_dir, "PDF report", &mut report)?;

    for warning in &report.warnings {
        warn!(archive = %archive_name, "{warning}");
    }
    info!(
        archive = %archive_name,
        files = report.archived.len(),
        "archive complete"
    );
    Ok(report)
}
