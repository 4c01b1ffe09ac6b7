use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use foreflow_core::config::{load_config, HeadcountConfig};
use foreflow_core::db;
use foreflow_core::headcount::pipeline::{
    record_failure, resolve_run_dates, run_pipeline, PipelineOutcome, RunOptions,
};
use foreflow_core::telemetry;

#[derive(Parser, Debug)]
#[command(author, version, about = "ADP tenure data pipeline", long_about = None)]
struct Cli {
    /// Path to the ADP Excel file (.xls or .xlsx)
    #[arg(long)]
    file: PathBuf,
    /// Snapshot date (YYYY-MM-DD). Defaults to the current Monday
    #[arg(long)]
    snapshot_date: Option<String>,
    /// Report date (YYYY-MM-DD). Defaults to the previous Monday
    #[arg(long)]
    report_date: Option<String>,
    /// Delete rows already loaded for the snapshot date and reload
    #[arg(long)]
    force: bool,
    /// Load the staging table only
    #[arg(long)]
    skip_calculation: bool,
    /// Pipeline configuration file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config: HeadcountConfig = match load_config(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init(&config.logging.level);

    let mut snapshot_date = None;
    match run(&cli, &config, &mut snapshot_date).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            record_failure(
                &cli.config,
                &config.logging,
                &cli.file,
                snapshot_date,
                &err,
                Local::now().naive_local(),
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: &Cli,
    config: &HeadcountConfig,
    snapshot_date: &mut Option<NaiveDate>,
) -> Result<()> {
    let dates = resolve_run_dates(
        cli.snapshot_date.as_deref(),
        cli.report_date.as_deref(),
        Local::now().date_naive(),
    )?;
    *snapshot_date = Some(dates.snapshot_date);

    let storage = db::connect(&config.database)
        .await
        .with_context(|| format!("failed to connect to {} database", config.database.engine))?;

    let options = RunOptions {
        force: cli.force,
        skip_calculation: cli.skip_calculation,
    };
    let result = run_pipeline(storage.as_ref(), &config.adp, &cli.file, dates, options).await;
    storage.close().await;

    match result? {
        PipelineOutcome::Skipped {
            existing_staging,
            existing_summary,
        } => println!(
            "Data already exists for {} (Bronze: {existing_staging}, Silver: {existing_summary}). Use --force to overwrite.",
            dates.snapshot_date
        ),
        PipelineOutcome::Completed {
            staging_rows,
            summary_rows: Some(summary_rows),
        } => println!(
            "Pipeline completed successfully. Bronze: {staging_rows}, Silver: {summary_rows} records"
        ),
        PipelineOutcome::Completed {
            staging_rows,
            summary_rows: None,
        } => println!(
            "Pipeline completed successfully. Bronze: {staging_rows} records (calculation skipped)"
        ),
    }
    Ok(())
}
