use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use tracing::info;

use crate::errors::ParserError;
use crate::frame::{dedupe_headers, missing_columns, text_frame};

const SOURCE: &str = "ADP";
const SUPPORTED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

pub const ADP_REQUIRED_COLUMNS: [&str; 7] = [
    "File Number",
    "Payroll Name",
    "Hire Date",
    "Position Status",
    "Home Department Code",
    "Clock Full Code",
    "Associate ID",
];

/// Read the first worksheet of an ADP tenure export into an all-text frame.
///
/// Every cell becomes a string (or null when empty) so identifiers such as
/// `File Number`, `Clock Full Code`, and `Home Department Code` keep their
/// leading zeros. Typing happens in the transform step.
pub fn read_adp_file(path: impl AsRef<Path>) -> Result<DataFrame, ParserError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ParserError::NotFound {
            source_name: SOURCE,
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ParserError::UnsupportedFormat {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{extension}")
            },
            expected: ".xls or .xlsx",
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|err| ParserError::Spreadsheet {
        source_name: SOURCE,
        message: err.to_string(),
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParserError::EmptyData {
            source_name: SOURCE,
        })?
        .map_err(|err| ParserError::Spreadsheet {
            source_name: SOURCE,
            message: err.to_string(),
        })?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(ParserError::EmptyData {
        source_name: SOURCE,
    })?;
    let headers = dedupe_headers(
        header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| match cell_text(cell) {
                Some(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => format!("Unnamed: {idx}"),
            })
            .collect(),
    );

    let body: Vec<Vec<Option<String>>> = rows
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let df = text_frame(&headers, &body).map_err(|source| ParserError::Polars {
        source_name: SOURCE,
        source,
    })?;

    info!(records = df.height(), path = %path.display(), "read ADP file");
    Ok(df)
}

/// Check the columns every downstream step depends on.
pub fn validate_adp_file_structure(df: &DataFrame) -> Result<(), ParserError> {
    let missing = missing_columns(df, &ADP_REQUIRED_COLUMNS);
    if !missing.is_empty() {
        return Err(ParserError::MissingColumns {
            source_name: SOURCE,
            missing,
        });
    }
    info!("ADP file structure validation passed");
    Ok(())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) => Some(value.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(float_text(*value)),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if datetime.time() == chrono::NaiveTime::MIN => {
                Some(datetime.format("%Y-%m-%d").to_string())
            }
            Some(datetime) => Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Some(value.as_f64().to_string()),
        },
        Data::DateTimeIso(value) | Data::DurationIso(value) => Some(value.clone()),
    }
}

/// Integral floats print without a trailing `.0` so numeric ids stay ids.
fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
