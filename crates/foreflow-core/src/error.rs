// crates/foreflow-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    Format(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database operation failed: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("File I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Parser(foreflow_parser::ParserError),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Map reader failures onto the pipeline's error kinds so callers can match on
/// not-found / format / validation regardless of which reader raised them.
impl From<foreflow_parser::ParserError> for PipelineError {
    fn from(err: foreflow_parser::ParserError) -> Self {
        use foreflow_parser::ParserError as P;
        match err {
            P::NotFound { .. } => PipelineError::NotFound(err.to_string()),
            P::UnsupportedFormat { .. } => PipelineError::Format(err.to_string()),
            P::MissingColumns { .. } => PipelineError::Validation(err.to_string()),
            other => PipelineError::Parser(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
