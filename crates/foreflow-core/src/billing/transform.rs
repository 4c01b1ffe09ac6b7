use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use foreflow_parser::{parse_duration_to_decimal, round2, validate_clickup_columns};
use polars::prelude::*;
use tracing::{info, warn};

use super::{transform_category, BillingRecord};
use crate::config::BillingConfig;
use crate::error::{PipelineError, Result};
use crate::frame::{date_column, text_column};

pub const START_TEXT: &str = "Start Text";
pub const TIME_TRACKED_TEXT: &str = "Time Tracked Text";
pub const CATEGORY: &str = "CATEGORY";
pub const USERNAME: &str = "Username";
pub const TASK_NAME: &str = "Task Name";
pub const CUSTOM_TASK_ID: &str = "Custom Task ID";

/// Column order of the accounting CSV.
pub const CLEANED_COLUMNS: [&str; 7] = [
    "Date",
    "Month-Year",
    "Client",
    "Name",
    "Billable Hours",
    "Task",
    "Task ID",
];

const START_DATE_FORMAT: &str = "%m/%d/%Y";

/// Source columns a run needs: the configured mapping plus the ones the
/// transform reads directly.
pub fn required_columns(config: &BillingConfig) -> Vec<String> {
    let mut required: BTreeSet<String> = config.column_mapping.keys().cloned().collect();
    for name in [START_TEXT, TIME_TRACKED_TEXT, CATEGORY, USERNAME, TASK_NAME, CUSTOM_TASK_ID] {
        required.insert(name.to_string());
    }
    required.into_iter().collect()
}

/// `09/29/2025, 1:23:21 PM EDT` → 2025-09-29. Time and zone are ignored.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split(',').next()?.trim();
    NaiveDate::parse_from_str(date_part, START_DATE_FORMAT).ok()
}

/// Turn an all-text ClickUp export into cleaned records sorted by
/// (date, client, name). Rates and amounts are left at zero.
pub fn process_clickup_export(df: &DataFrame, config: &BillingConfig) -> Result<Vec<BillingRecord>> {
    validate_clickup_columns(df, required_columns(config).as_slice())?;

    let starts = text_column(df, START_TEXT)?;
    let durations = text_column(df, TIME_TRACKED_TEXT)?;
    let categories = text_column(df, CATEGORY)?;
    let usernames = text_column(df, USERNAME)?;
    let tasks = text_column(df, TASK_NAME)?;
    let task_ids = text_column(df, CUSTOM_TASK_ID)?;

    let mut records = Vec::with_capacity(df.height());
    for (idx, start) in starts.iter().enumerate() {
        let start = start.as_deref().unwrap_or_default();
        let date = parse_start_date(start).ok_or_else(|| {
            PipelineError::Validation(format!(
                "row {}: could not parse {START_TEXT} '{start}'",
                idx + 1
            ))
        })?;
        let category = categories[idx].as_deref().unwrap_or_default();

        records.push(BillingRecord {
            date,
            month_year: date.format("%Y-%m").to_string(),
            client: transform_category(category, &config.category_transforms),
            name: usernames[idx].clone().unwrap_or_default(),
            billable_hours: parse_duration_to_decimal(durations[idx].as_deref()),
            task: tasks[idx].clone(),
            task_id: task_ids[idx].clone(),
            rate: 0.0,
            amount: 0.0,
        });
    }

    records.sort_by(|a, b| (a.date, &a.client, &a.name).cmp(&(b.date, &b.client, &b.name)));
    info!(records = records.len(), "cleaned ClickUp export");
    Ok(records)
}

/// Attach each record's client rate and `round2(hours * rate)`.
///
/// Clients without a configured rate bill at 0.0; each such client is warned
/// about once.
pub fn calculate_billing_amounts(records: &mut [BillingRecord], rates: &HashMap<String, f64>) {
    let mut unrated = BTreeSet::new();
    for record in records.iter_mut() {
        record.rate = match rates.get(&record.client) {
            Some(rate) => *rate,
            None => {
                unrated.insert(record.client.clone());
                0.0
            }
        };
        record.amount = round2(record.billable_hours * record.rate);
    }
    for client in unrated {
        warn!(client = %client, "no billing rate configured, billing at 0.00");
    }
}

/// Records as a frame with every billing column, `Date` typed as a date.
pub fn records_to_frame(records: &[BillingRecord]) -> Result<DataFrame> {
    let dates: Vec<Option<NaiveDate>> = records.iter().map(|r| Some(r.date)).collect();
    let month_years: Vec<&str> = records.iter().map(|r| r.month_year.as_str()).collect();
    let clients: Vec<&str> = records.iter().map(|r| r.client.as_str()).collect();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let hours: Vec<f64> = records.iter().map(|r| r.billable_hours).collect();
    let tasks: Vec<Option<&str>> = records.iter().map(|r| r.task.as_deref()).collect();
    let task_ids: Vec<Option<&str>> = records.iter().map(|r| r.task_id.as_deref()).collect();
    let rates: Vec<f64> = records.iter().map(|r| r.rate).collect();
    let amounts: Vec<f64> = records.iter().map(|r| r.amount).collect();

    let df = DataFrame::new(vec![
        date_column("Date", &dates)?,
        Column::new("Month-Year".into(), month_years),
        Column::new("Client".into(), clients),
        Column::new("Name".into(), names),
        Column::new("Billable Hours".into(), hours),
        Column::new("Task".into(), tasks),
        Column::new("Task ID".into(), task_ids),
        Column::new("Billing Rate".into(), rates),
        Column::new("Amount".into(), amounts),
    ])?;
    Ok(df)
}

/// Write the accounting CSV. Rates and amounts are not part of it.
pub fn write_cleaned_csv(records: &[BillingRecord], path: &Path) -> Result<()> {
    let mut df = records_to_frame(records)?.select(CLEANED_COLUMNS)?;
    let mut file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    info!(path = %path.display(), rows = df.height(), "cleaned CSV written");
    Ok(())
}
