use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{source_name} file not found: {}", .path.display())]
    NotFound {
        source_name: &'static str,
        path: PathBuf,
    },

    #[error("Unsupported file format: {extension}. Expected {expected}")]
    UnsupportedFormat {
        extension: String,
        expected: &'static str,
    },

    #[error("{source_name} is missing required columns: {missing:?}")]
    MissingColumns {
        source_name: &'static str,
        missing: Vec<String>,
    },

    #[error("{source_name} file did not contain a header row")]
    EmptyData { source_name: &'static str },

    #[error("{source_name} spreadsheet error: {message}")]
    Spreadsheet {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} I/O error: {source}")]
    Io {
        source_name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name} dataframe error: {source}")]
    Polars {
        source_name: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },
}
