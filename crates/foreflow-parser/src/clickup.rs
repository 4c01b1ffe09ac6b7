use std::io::Cursor;

use polars::prelude::*;

use crate::errors::ParserError;
use crate::frame::missing_columns;

const SOURCE: &str = "ClickUp export";

/// Read a ClickUp time-tracking export with every column kept as text.
///
/// Durations, dates, and task ids are interpreted later; reading them as
/// strings keeps values like `0:45` or `00123` intact.
pub fn read_clickup_export(content: &[u8]) -> Result<DataFrame, ParserError> {
    let cursor = Cursor::new(content);
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|source| ParserError::Polars {
            source_name: SOURCE,
            source,
        })
}

/// Fail with every missing column named, not just the first.
pub fn validate_clickup_columns<S: AsRef<str>>(
    df: &DataFrame,
    required: &[S],
) -> Result<(), ParserError> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParserError::MissingColumns {
            source_name: SOURCE,
            missing,
        })
    }
}
