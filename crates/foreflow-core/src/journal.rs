//! Append-only Markdown journal of pipeline failures.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{PipelineError, Result};

pub fn format_error_entry(timestamp: NaiveDateTime, context: &str, message: &str) -> String {
    format!(
        "\n## Pipeline Error - {}\n\n**Context:** {context}\n\n**Error:** {message}\n\n---\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Append one entry, creating the file and its parent directories as needed.
pub fn append_error(
    path: &Path,
    timestamp: NaiveDateTime,
    context: &str,
    message: &str,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| PipelineError::io(path, err))?;
    file.write_all(format_error_entry(timestamp, context, message).as_bytes())
        .map_err(|err| PipelineError::io(path, err))
}
