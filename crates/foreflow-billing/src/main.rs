use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use foreflow_core::billing::archive::{archive_month, validate_period};
use foreflow_core::billing::process::process_latest;
use foreflow_core::config::{load_config, BillingConfig};
use foreflow_core::telemetry;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "ClickUp billing processing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the newest raw ClickUp export and write the CSV and summary report
    Process(ProcessArgs),
    /// Move a finished month's raw exports and outputs into archive folders
    Archive(ArchiveArgs),
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Project root holding raw/ and output/
    #[arg(long, default_value = ".")]
    root: PathBuf,
    /// Billing config; defaults to <root>/config.yaml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ArchiveArgs {
    /// Four-digit year, 2020-2100
    year: i32,
    /// Month number, 1-12
    month: u32,
    /// Project root holding raw/ and output/
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

const ARCHIVE_USAGE: &str = "Usage: foreflow-billing archive YYYY MM

Example:
  foreflow-billing archive 2025 09

This will archive:
  - Raw CSV files from raw/clickup_billing/
  - Output files from output/monthly_billing/cleaned/ and /reports/

To:
  - raw/clickup_billing/archive/YYYY-MM/
  - output/monthly_billing/archive/YYYY-MM/";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help / --version print and succeed; anything else is a usage error
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    telemetry::init("INFO");

    let result = match cli.command {
        Command::Process(args) => handle_process(args),
        Command::Archive(args) => handle_archive(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_process(args: ProcessArgs) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| args.root.join("config.yaml"));
    let config: BillingConfig = load_config(&config_path)
        .with_context(|| format!("failed to load billing config {}", config_path.display()))?;

    let outcome = process_latest(&args.root, &config, Local::now().naive_local())?;

    println!("Processing: {}", outcome.input.display());
    println!("✓ Clean CSV written to: {}", outcome.cleaned_csv.display());
    println!("✓ Summary report written to: {}", outcome.summary_report.display());
    println!("\n✅ Processing complete!");
    println!("\nTotal records processed: {}", outcome.records);
    println!("Total billable hours: {:.2}", outcome.total_hours);
    println!("Total amount: ${:.2}", outcome.total_amount);
    Ok(())
}

fn handle_archive(args: ArchiveArgs) -> Result<()> {
    if let Err(err) = validate_period(args.year, args.month) {
        eprintln!("Error: Invalid year or month - {err}\n\n{ARCHIVE_USAGE}");
        return Err(err.into());
    }

    let report = archive_month(&args.root, args.year, args.month)?;

    println!("\n📦 Archived data for {}", report.archive_name);
    println!("{}", "=".repeat(60));
    println!("\n📍 Archived to:");
    println!("   Raw data: {}", report.raw_archive_dir.display());
    println!("   Reports:  {}", report.output_archive_dir.display());

    if !report.archived.is_empty() {
        println!("\n📋 Files archived ({}):", report.archived.len());
        for file in &report.archived {
            println!("   • {file}");
        }
    }
    if !report.warnings.is_empty() {
        println!("\n⚠️  Warnings:");
        for warning in &report.warnings {
            println!("   • {warning}");
        }
    }
    println!();
    Ok(())
}
