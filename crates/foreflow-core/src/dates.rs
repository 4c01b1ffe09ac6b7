//! Monday-based snapshot/report date rules for the weekly headcount run.
//!
//! The pipeline runs on a Monday: `snapshot_date` is that Monday and
//! `report_date` is the Monday one week earlier.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

use crate::error::{PipelineError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MondayPair {
    pub snapshot_date: NaiveDate,
    pub report_date: NaiveDate,
}

/// Monday of the reference date's week, and the Monday before it.
pub fn monday_pair(reference: NaiveDate) -> MondayPair {
    let days_since_monday = i64::from(reference.weekday().num_days_from_monday());
    let snapshot_date = reference - Duration::days(days_since_monday);
    MondayPair {
        snapshot_date,
        report_date: snapshot_date - Duration::days(7),
    }
}

pub fn current_monday_pair() -> MondayPair {
    monday_pair(Local::now().date_naive())
}

pub fn is_monday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// The given date when it is a Monday, otherwise the following Monday.
pub fn next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = (7 - i64::from(date.weekday().num_days_from_monday())) % 7;
    date + Duration::days(days_until_monday)
}

/// Monday through Sunday of the week starting at `monday`.
pub fn week_range(monday: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    if !is_monday(monday) {
        return Err(PipelineError::Validation(format!(
            "Date {monday} is not a Monday"
        )));
    }
    Ok((monday, monday + Duration::days(6)))
}

pub fn format_business_period(snapshot_date: NaiveDate, report_date: NaiveDate) -> String {
    let report_sunday = report_date + Duration::days(6);
    format!("Week of {report_date} through {report_sunday} (reported {snapshot_date})")
}

/// Both dates must be Mondays, report strictly before snapshot, exactly a week apart.
pub fn validate_monday_dates(snapshot_date: NaiveDate, report_date: NaiveDate) -> Result<()> {
    if !is_monday(snapshot_date) {
        return Err(PipelineError::Validation(format!(
            "Snapshot date {snapshot_date} is not a Monday"
        )));
    }
    if !is_monday(report_date) {
        return Err(PipelineError::Validation(format!(
            "Report date {report_date} is not a Monday"
        )));
    }
    if report_date >= snapshot_date {
        return Err(PipelineError::Validation(format!(
            "Report date {report_date} should be before snapshot date {snapshot_date}"
        )));
    }

    let days_diff = (snapshot_date - report_date).num_days();
    if days_diff != 7 {
        return Err(PipelineError::Validation(format!(
            "Report and snapshot dates should be exactly 7 days apart, but got {days_diff} days between {report_date} and {snapshot_date}"
        )));
    }
    Ok(())
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        PipelineError::Validation(format!("Invalid date '{value}', expected YYYY-MM-DD"))
    })
}
