use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use foreflow_core::billing::archive::archive_month;
use foreflow_core::billing::process::{latest_export, process_latest};
use foreflow_core::billing::report::{render_markdown, summarize};
use foreflow_core::billing::transform::{calculate_billing_amounts, process_clickup_export};
use foreflow_core::config::{parse_config, BillingConfig};
use foreflow_core::PipelineError;
use foreflow_parser::read_clickup_export;

const CONFIG: &str = r#"
column_mapping:
  Start Text: Date
  Time Tracked Text: Billable Hours
  CATEGORY: Client
  Username: Name
  Task Name: Task
  Custom Task ID: Task ID
category_transforms:
  ACME-INT: Acme
  GLBX: Globex
billing_rates:
  Acme: 150.0
  Globex: 100.0
remaining_budget:
  Acme: 1000.0
  Globex: 10000.0
"#;

const EXPORT: &str = "\
Username,CATEGORY,Task Name,Custom Task ID,Start Text,Time Tracked Text
Riley,GLBX,Data review,GX-1,\"09/30/2025, 9:00:00 AM EDT\",2:30
Avery,ACME-INT,Pipeline fixes,AC-7,\"09/29/2025, 1:23:21 PM EDT\",1:15
Riley,ACME-INT,Dashboard,AC-8,\"09/29/2025, 3:00:00 PM EDT\",0:45:00
Avery,Unmapped Co,Intro call,,\"09/02/2025, 10:00:00 AM EDT\",1:00
";

fn config() -> BillingConfig {
    parse_config(CONFIG).expect("billing config")
}

fn generated_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 10, 1)
        .unwrap()
        .and_hms_opt(8, 5, 0)
        .unwrap()
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn export_is_cleaned_and_sorted() -> Result<()> {
    let df = read_clickup_export(EXPORT.as_bytes())?;
    let records = process_clickup_export(&df, &config())?;

    let order: Vec<(String, &str, &str)> = records
        .iter()
        .map(|r| (r.date.to_string(), r.client.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("2025-09-02".to_string(), "Unmapped Co", "Avery"),
            ("2025-09-29".to_string(), "Acme", "Avery"),
            ("2025-09-29".to_string(), "Acme", "Riley"),
            ("2025-09-30".to_string(), "Globex", "Riley"),
        ]
    );
    assert_eq!(records[1].billable_hours, 1.25);
    assert_eq!(records[2].billable_hours, 0.75);
    assert_eq!(records[3].month_year, "2025-09");
    assert_eq!(records[0].task_id, None);
    Ok(())
}

#[test]
fn missing_source_columns_are_all_named() -> Result<()> {
    let df = read_clickup_export(b"Username,Task Name\nRiley,Review\n")?;
    let err = process_clickup_export(&df, &config()).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, PipelineError::Validation(_)));
    for column in ["CATEGORY", "Start Text", "Time Tracked Text", "Custom Task ID"] {
        assert!(message.contains(column), "{message} should name {column}");
    }
    Ok(())
}

#[test]
fn unparseable_start_text_is_a_validation_error() -> Result<()> {
    let export = "Username,CATEGORY,Task Name,Custom Task ID,Start Text,Time Tracked Text\n\
                  Riley,GLBX,Review,GX-1,yesterday,1:00\n";
    let df = read_clickup_export(export.as_bytes())?;
    let err = process_clickup_export(&df, &config()).unwrap_err();
    assert!(matches!(err, PipelineError::Validation(ref m) if m.contains("yesterday")));
    Ok(())
}

#[test]
fn amounts_and_budget_alerts() -> Result<()> {
    let config = config();
    let df = read_clickup_export(EXPORT.as_bytes())?;
    let mut records = process_clickup_export(&df, &config)?;
    calculate_billing_amounts(&mut records, &config.billing_rates);

    assert_eq!(records[1].amount, 187.5);
    assert_eq!(records[0].rate, 0.0);
    assert_eq!(records[0].amount, 0.0);

    let summary = summarize(&records, &config)?;
    let total: f64 = summary.clients.iter().map(|c| c.amount).sum();
    assert!((total - summary.total_amount).abs() < 1e-9);
    assert_eq!(summary.total_hours, 5.5);

    let acme = &summary.clients[0];
    assert_eq!(acme.client, "Acme");
    assert_eq!(acme.amount, 300.0);
    assert_eq!(acme.remaining, 700.0);
    assert!(!acme.is_low_budget());

    let unmapped = summary
        .clients
        .iter()
        .find(|c| c.client == "Unmapped Co")
        .unwrap();
    assert_eq!(unmapped.months_left, None);

    let markdown = render_markdown(&summary, generated_at());
    assert!(markdown.starts_with("# Billing Summary Report\n\n**Report Period:** 2025-09-01 to 2025-09-30\n**Generated:** 2025-10-01 08:05\n"));
    assert!(markdown.contains("| Acme | 2.00 | $150.00 | $300.00 | $700.00 | 2.3 |"));
    assert!(markdown.contains("| Unmapped Co | 1.00 | $0.00 | $0.00 | $0.00 | N/A |"));
    assert!(markdown.contains("**Grand Total:** 5.50 hours = $550.00"));
    assert!(!markdown.contains("Budget Alerts"));

    let section = |title: &str| markdown.find(title).unwrap();
    assert!(section("## Summary by Client") < section("## Summary by Team Member"));
    assert!(section("## Summary by Team Member") < section("## Summary by Client and Month"));
    assert!(section("## Summary by Client and Month") < section("## Detailed Billing Log"));
    Ok(())
}

#[test]
fn low_budget_clients_are_flagged() -> Result<()> {
    let mut config = config();
    config.remaining_budget.insert("Acme".to_string(), 700.0);

    let df = read_clickup_export(EXPORT.as_bytes())?;
    let mut records = process_clickup_export(&df, &config)?;
    calculate_billing_amounts(&mut records, &config.billing_rates);
    let summary = summarize(&records, &config)?;
    let markdown = render_markdown(&summary, generated_at());

    // 700 - 300 leaves 400, or 1.3 months at this rate
    assert!(markdown.contains("| Acme | 2.00 | $150.00 | $300.00 | $400.00 | 1.3 ⚠️ |"));
    assert!(markdown.contains("### ⚠️ Budget Alerts\n\n- **Acme**: Only 1.3 months of budget remaining ($400.00)\n"));
    assert_eq!(summary.low_budget_clients().count(), 1);
    Ok(())
}

#[test]
fn process_writes_both_outputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(&root.join("raw/clickup_billing/2025-08-export.csv"), "stale");
    write(&root.join("raw/clickup_billing/2025-09-export.csv"), EXPORT);

    assert_eq!(
        latest_export(root)?.file_name().unwrap(),
        "2025-09-export.csv"
    );

    let outcome = process_latest(root, &config(), generated_at())?;
    assert_eq!(outcome.records, 4);
    assert_eq!(
        outcome.cleaned_csv,
        root.join("output/monthly_billing/cleaned/billing_report_2025-09-02_to_2025-09-30.csv")
    );
    assert_eq!(
        outcome.summary_report,
        root.join("output/monthly_billing/reports/billing_summary_2025-09.md")
    );

    let csv = fs::read_to_string(&outcome.cleaned_csv)?;
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Date,Month-Year,Client,Name,Billable Hours,Task,Task ID")
    );
    assert!(lines.next().unwrap().starts_with("2025-09-02,2025-09,Unmapped Co,Avery,"));
    assert!(!csv.contains("Amount"));
    Ok(())
}

#[test]
fn process_without_exports_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = process_latest(dir.path(), &config(), generated_at()).unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[test]
fn archive_moves_month_outputs_and_reports_gaps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(&root.join("raw/clickup_billing/export.csv"), EXPORT);
    write(
        &root.join("output/monthly_billing/cleaned/billing_report_2025-09-02_to_2025-09-30.csv"),
        "x",
    );
    write(
        &root.join("output/monthly_billing/cleaned/billing_report_2025-10-01_to_2025-10-31.csv"),
        "x",
    );
    write(&root.join("output/monthly_billing/reports/billing_summary_2025-09.pdf"), "x");

    let report = archive_month(root, 2025, 9)?;
    assert_eq!(report.archive_name, "2025-09");
    assert_eq!(
        report.archived,
        vec![
            "Raw CSV: export.csv".to_string(),
            "Cleaned CSV: billing_report_2025-09-02_to_2025-09-30.csv".to_string(),
            "PDF report: billing_summary_2025-09.pdf".to_string(),
        ]
    );
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("billing_summary_2025-09.md"));

    assert!(root
        .join("raw/clickup_billing/archive/2025-09/export.csv")
        .exists());
    assert!(!root.join("raw/clickup_billing/export.csv").exists());
    assert!(root
        .join("output/monthly_billing/cleaned/billing_report_2025-10-01_to_2025-10-31.csv")
        .exists());
    Ok(())
}

#[test]
fn archive_rejects_out_of_range_periods() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        archive_month(dir.path(), 2019, 5),
        Err(PipelineError::Validation(_))
    ));
    assert!(matches!(
        archive_month(dir.path(), 2025, 13),
        Err(PipelineError::Validation(_))
    ));
    assert!(!dir.path().join("raw").exists());
}

#[test]
fn processed_export_is_the_one_archived() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(&root.join("raw/clickup_billing/2025-09-export.csv"), EXPORT);
    write(&root.join("raw/clickup_billing/zz-notes.CSV"), "not an export");

    let outcome = process_latest(root, &config(), generated_at())?;
    assert_eq!(outcome.input.file_name().unwrap(), "2025-09-export.csv");

    let report = archive_month(root, 2025, 9)?;
    assert!(report
        .archived
        .contains(&"Raw CSV: 2025-09-export.csv".to_string()));
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert!(root
        .join("raw/clickup_billing/archive/2025-09/2025-09-export.csv")
        .exists());
    assert!(root
        .join("output/monthly_billing/archive/2025-09/billing_summary_2025-09.md")
        .exists());

    // Left in place by both: neither treats it as an export.
    assert!(root.join("raw/clickup_billing/zz-notes.CSV").exists());
    Ok(())
}

#[test]
fn archive_with_nothing_to_move_only_warns() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    let report = archive_month(root, 2025, 9)?;
    assert!(report.archived.is_empty());
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings[0].contains("No CSV files found"));
    assert!(report.warnings[1].contains("billing_report_2025-09-*.csv"));
    assert!(report.warnings[2].contains("billing_summary_2025-09.md"));
    assert!(root.join("raw/clickup_billing/archive/2025-09").is_dir());
    assert!(root.join("output/monthly_billing/archive/2025-09").is_dir());
    Ok(())
}
