use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use foreflow_parser::{read_adp_file, validate_adp_file_structure};
use tracing::{error, info, warn};

use super::aggregate::execute_headcount_calculation;
use super::load::{check_existing_data, delete_existing_data, load_to_bronze_table};
use super::transform::{clean_adp_data, validate_cleaned_data};
use super::TableFamily;
use crate::config::{resolve_relative, AdpConfig, LoggingConfig};
use crate::dates::{format_business_period, monday_pair, parse_date, validate_monday_dates, MondayPair};
use crate::db::StorageTarget;
use crate::error::Result;
use crate::journal;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Delete rows already loaded for the snapshot date before reloading.
    pub force: bool,
    /// Load staging only.
    pub skip_calculation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Rows already existed for the snapshot date and the run was not forced.
    /// Nothing was written.
    Skipped {
        existing_staging: i64,
        existing_summary: i64,
    },
    Completed {
        staging_rows: u64,
        /// `None` when the calculation was skipped.
        summary_rows: Option<u64>,
    },
}

/// Resolve the run's (snapshot, report) pair from optional CLI values.
///
/// * both given: parsed and checked as a Monday pair
/// * snapshot only: report is snapshot - 7, no Monday check
/// * neither, or report only: the pair for `today`'s week
pub fn resolve_run_dates(
    snapshot_date: Option<&str>,
    report_date: Option<&str>,
    today: NaiveDate,
) -> Result<MondayPair> {
    match (snapshot_date, report_date) {
        (Some(snapshot), Some(report)) => {
            let snapshot_date = parse_date(snapshot)?;
            let report_date = parse_date(report)?;
            validate_monday_dates(snapshot_date, report_date)?;
            Ok(MondayPair {
                snapshot_date,
                report_date,
            })
        }
        (Some(snapshot), None) => {
            let snapshot_date = parse_date(snapshot)?;
            Ok(MondayPair {
                snapshot_date,
                report_date: snapshot_date - Duration::days(7),
            })
        }
        (None, Some(report)) => {
            warn!(
                report_date = report,
                "report date given without snapshot date; using the current Monday pair"
            );
            Ok(monday_pair(today))
        }
        (None, None) => Ok(monday_pair(today)),
    }
}

/// Run one extract → transform → load → aggregate pass for `file`.
///
/// Existing rows for the snapshot date stop the run before any write unless
/// `options.force` is set, in which case staging and then summary rows for the
/// date are deleted first.
pub async fn run_pipeline(
    storage: &dyn StorageTarget,
    adp: &AdpConfig,
    file: &Path,
    dates: MondayPair,
    options: RunOptions,
) -> Result<PipelineOutcome> {
    let MondayPair {
        snapshot_date,
        report_date,
    } = dates;
    info!(
        "Starting ADP pipeline for {}",
        format_business_period(snapshot_date, report_date)
    );
    info!(snapshot_date = %snapshot_date, report_date = %report_date, "run dates resolved");

    info!(file = %file.display(), "reading ADP file");
    let raw = read_adp_file(file)?;
    validate_adp_file_structure(&raw)?;

    let cleaned = clean_adp_data(&raw, Some(snapshot_date))?;
    validate_cleaned_data(&cleaned)?;

    let existing_staging =
        check_existing_data(storage, adp, snapshot_date, TableFamily::Staging).await?;
    let existing_summary =
        check_existing_data(storage, adp, snapshot_date, TableFamily::Summary).await?;

    if (existing_staging > 0 || existing_summary > 0) && !options.force {
        warn!(
            snapshot_date = %snapshot_date,
            existing_staging,
            existing_summary,
            "data already exists for snapshot date; use --force to overwrite"
        );
        return Ok(PipelineOutcome::Skipped {
            existing_staging,
            existing_summary,
        });
    }

    if options.force {
        if existing_staging > 0 {
            delete_existing_data(storage, adp, snapshot_date, TableFamily::Staging).await?;
        }
        if existing_summary > 0 {
            delete_existing_data(storage, adp, snapshot_date, TableFamily::Summary).await?;
        }
    }

    let staging_rows = load_to_bronze_table(storage, adp, &cleaned).await?;

    let summary_rows = if options.skip_calculation {
        info!(staging_rows, "pipeline completed (calculation skipped)");
        None
    } else {
        let inserted =
            execute_headcount_calculation(storage, adp, snapshot_date, report_date).await?;
        info!(staging_rows, summary_rows = inserted, "pipeline completed");
        Some(inserted)
    };

    Ok(PipelineOutcome::Completed {
        staging_rows,
        summary_rows,
    })
}

/// Log a failed run and append it to the error journal.
///
/// The journal path is `logging.error_log_file` resolved against the
/// directory holding `config_path`. Returns that path; a journal that cannot
/// be written is logged and otherwise ignored.
pub fn record_failure(
    config_path: &Path,
    logging: &LoggingConfig,
    file: &Path,
    snapshot_date: Option<NaiveDate>,
    err: &dyn Display,
    timestamp: NaiveDateTime,
) -> PathBuf {
    let message = format!("Pipeline failed: {err:#}");
    error!("{message}");

    let snapshot = snapshot_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "unresolved".to_string());
    let context = format!("File: {}, Snapshot: {snapshot}", file.display());

    let journal_path = resolve_relative(config_path, &logging.error_log_file);
    if let Err(journal_err) = journal::append_error(&journal_path, timestamp, &context, &message) {
        error!(path = %journal_path.display(), "failed to write error journal: {journal_err}");
    }
    journal_path
}
