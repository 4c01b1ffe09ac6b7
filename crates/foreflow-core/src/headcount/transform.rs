use chrono::{Local, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::frame::{date_column, text_values};

pub const DUPLICATE_COLUMN: &str = "Previous Termination Date.1";
pub const DEPARTMENT_CODE_COLUMN: &str = "home_department_code";
pub const SNAPSHOT_DATE_COLUMN: &str = "snapshot_date";
pub const DEPARTMENT_CODE_WIDTH: usize = 6;

/// ADP export header → staging column. Headers absent from a file are skipped.
pub const COLUMN_MAPPING: [(&str, &str); 30] = [
    ("File Number", "file_number"),
    ("Payroll Name", "payroll_name"),
    ("Hire Date", "hire_date"),
    ("Rehire Date", "rehire_date"),
    ("Previous Termination Date", "previous_termination_date"),
    ("Termination Date", "termination_date"),
    ("Termination Reason Description", "termination_reason"),
    ("Position Status", "position_status"),
    ("Leave of Absence Start Date", "leave_of_absence_start_date"),
    ("Leave of Absence Return Date", "leave_of_absence_return_date"),
    ("Home Department Code", "home_department_code"),
    ("Home Department Description", "home_department_description"),
    ("Payroll Company Code", "payroll_company_code"),
    ("Position ID", "position_id"),
    ("Clock Full Code", "client_code"),
    ("Clock Full Description", "client"),
    ("Regular Pay Rate Amount", "regular_pay_rate"),
    ("Recruited by", "recruited_by"),
    ("Business Unit Description", "business_unit"),
    ("Requisition Key", "requisition_key"),
    ("Personal Contact: Personal Email", "email"),
    ("Associate ID", "adp_id"),
    ("Requisition_id", "requisition_id"),
    ("applicant_id", "applicant_id"),
    ("Regular Hours Total", "regular_hours"),
    ("Overtime Hours Total", "ot_hours"),
    ("Other hours", "pto_sick_hours"),
    ("Holiday", "holiday_hours"),
    ("Voluntary/Involuntary Termination Flag", "voluntary_involuntary_flag"),
    ("Personal Contact: Home Phone", "home_phone"),
];

pub const DATE_COLUMNS: [&str; 5] = [
    "hire_date",
    "rehire_date",
    "previous_termination_date",
    "termination_date",
    SNAPSHOT_DATE_COLUMN,
];

pub const INTEGER_COLUMNS: [&str; 2] = ["requisition_id", "applicant_id"];

pub const DECIMAL_COLUMNS: [&str; 5] = [
    "regular_pay_rate",
    "regular_hours",
    "ot_hours",
    "pto_sick_hours",
    "holiday_hours",
];

pub const REQUIRED_CLEAN_COLUMNS: [&str; 3] = ["file_number", "adp_id", SNAPSHOT_DATE_COLUMN];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Clean a raw ADP frame into the staging layout.
///
/// Steps run in a fixed order: trim text, drop the duplicated termination
/// column, rename to staging names, pad department codes, stamp the snapshot
/// date, coerce dates / integers / decimals, then force department codes to
/// exactly six characters. Coercion failures become nulls, not errors.
pub fn clean_adp_data(raw: &DataFrame, snapshot_date: Option<NaiveDate>) -> Result<DataFrame> {
    let mut df = raw.clone();

    strip_whitespace(&mut df)?;

    if df.column(DUPLICATE_COLUMN).is_ok() {
        df.drop_in_place(DUPLICATE_COLUMN)?;
    }

    for (source, target) in COLUMN_MAPPING {
        if df.column(source).is_ok() {
            df.rename(source, target.into())?;
        }
    }

    map_text_column(&mut df, DEPARTMENT_CODE_COLUMN, |code| {
        zero_pad(code, DEPARTMENT_CODE_WIDTH)
    })?;

    let snapshot_date = snapshot_date.unwrap_or_else(|| Local::now().date_naive());
    let stamp = snapshot_date.format("%Y-%m-%d").to_string();
    df.with_column(Series::new(
        SNAPSHOT_DATE_COLUMN.into(),
        vec![stamp.as_str(); df.height()],
    ))?;

    for name in DATE_COLUMNS {
        coerce_date_column(&mut df, name)?;
    }
    for name in INTEGER_COLUMNS {
        coerce_integer_column(&mut df, name)?;
    }
    for name in DECIMAL_COLUMNS {
        coerce_decimal_column(&mut df, name)?;
    }

    map_text_column(&mut df, DEPARTMENT_CODE_COLUMN, |code| {
        let truncated: String = code.chars().take(DEPARTMENT_CODE_WIDTH).collect();
        zero_pad(&truncated, DEPARTMENT_CODE_WIDTH)
    })?;

    info!(
        records = df.height(),
        snapshot_date = %snapshot_date,
        "cleaned ADP records"
    );
    Ok(df)
}

/// Check the cleaned frame before it is written anywhere.
pub fn validate_cleaned_data(df: &DataFrame) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_CLEAN_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Validation(format!(
            "Missing required columns after cleaning: {missing:?}"
        )));
    }

    let null_counts: Vec<(&str, usize)> = REQUIRED_CLEAN_COLUMNS
        .iter()
        .filter_map(|name| {
            let nulls = df.column(name).ok()?.null_count();
            (nulls > 0).then_some((*name, nulls))
        })
        .collect();
    if !null_counts.is_empty() {
        warn!(?null_counts, "found null values in required columns");
    }

    if let Ok(column) = df.column(DEPARTMENT_CODE_COLUMN) {
        let invalid = text_values(column)?
            .iter()
            .flatten()
            .filter(|code| code.chars().count() != DEPARTMENT_CODE_WIDTH)
            .count();
        if invalid > 0 {
            return Err(PipelineError::Validation(format!(
                "Found {invalid} records with invalid department codes"
            )));
        }
    }

    info!("cleaned data validation passed");
    Ok(())
}

/// Left-pad with `0` up to `width` characters; longer values are returned as is.
pub fn zero_pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.to_string()
    } else {
        format!("{}{}", "0".repeat(width - len), value)
    }
}

/// Parse the date shapes that show up in ADP exports; `None` when none match.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn strip_whitespace(df: &mut DataFrame) -> Result<()> {
    let text_columns: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::String)
        .map(|column| column.name().to_string())
        .collect();
    for name in text_columns {
        map_text_column(df, &name, |value| value.trim().to_string())?;
    }
    Ok(())
}

fn map_text_column<F>(df: &mut DataFrame, name: &str, transform: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    let Ok(column) = df.column(name) else {
        return Ok(());
    };
    let values: Vec<Option<String>> = text_values(column)?
        .into_iter()
        .map(|value| value.map(|text| transform(&text)))
        .collect();
    df.with_column(Series::new(
        name.into(),
        values.iter().map(|v| v.as_deref()).collect::<Vec<Option<&str>>>(),
    ))?;
    Ok(())
}

fn coerce_date_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let Ok(column) = df.column(name) else {
        return Ok(());
    };
    let dates: Vec<Option<NaiveDate>> = text_values(column)?
        .iter()
        .map(|value| value.as_deref().and_then(parse_flexible_date))
        .collect();
    df.with_column(date_column(name, &dates)?)?;
    Ok(())
}

fn coerce_integer_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let Ok(column) = df.column(name) else {
        return Ok(());
    };
    let values: Vec<Option<i64>> = text_values(column)?
        .iter()
        .map(|value| {
            let number = value.as_deref()?.trim().parse::<f64>().ok()?;
            (number.is_finite() && number.fract() == 0.0).then_some(number as i64)
        })
        .collect();
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

fn coerce_decimal_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let Ok(column) = df.column(name) else {
        return Ok(());
    };
    let values: Vec<Option<f64>> = text_values(column)?
        .iter()
        .map(|value| {
            value
                .as_deref()?
                .trim()
                .replace(['$', ','], "")
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
        })
        .collect();
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}
