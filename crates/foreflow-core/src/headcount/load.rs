use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{info, warn};

use super::transform::parse_flexible_date;
use super::TableFamily;
use crate::config::AdpConfig;
use crate::db::{ColumnKind, SqlValue, StorageTarget};
use crate::error::Result;
use crate::frame::text_values;
use crate::schema::staging_column_kind;

/// Upper bound on bound parameters per INSERT. SQLite's historical default
/// limit is 999.
pub const MAX_BIND_PARAMS: usize = 900;

fn column_values(column: &Column, kind: ColumnKind) -> Result<Vec<SqlValue>> {
    let values = match kind {
        ColumnKind::Text | ColumnKind::DepartmentCode => text_values(column)?
            .into_iter()
            .map(SqlValue::Text)
            .collect(),
        ColumnKind::Date => text_values(column)?
            .iter()
            .map(|value| SqlValue::Date(value.as_deref().and_then(parse_flexible_date)))
            .collect(),
        ColumnKind::Integer => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(SqlValue::Integer)
            .collect(),
        ColumnKind::Decimal => column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(SqlValue::Decimal)
            .collect(),
        ColumnKind::Timestamp => text_values(column)?
            .iter()
            .map(|value| {
                SqlValue::Timestamp(value.as_deref().and_then(|text| {
                    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").ok()
                }))
            })
            .collect(),
    };
    Ok(values)
}

fn insert_sql(
    storage: &dyn StorageTarget,
    table: &str,
    columns: &[String],
    rows: usize,
) -> String {
    let width = columns.len();
    let tuples = (0..rows)
        .map(|row| {
            let placeholders = (0..width)
                .map(|col| storage.placeholder(row * width + col + 1))
                .collect::<Vec<_>>()
                .join(", ");
            format!("({placeholders})")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES {tuples}",
        columns.join(", ")
    )
}

/// Append the cleaned frame to the staging table and return the rows submitted.
///
/// Only columns of the staging layout are written; anything else in the frame
/// is skipped with a warning. Rows already present for the same snapshot are
/// not touched, so loading twice duplicates them.
pub async fn load_to_bronze_table(
    storage: &dyn StorageTarget,
    adp: &AdpConfig,
    df: &DataFrame,
) -> Result<u64> {
    let table = storage.resolve_table(&adp.bronze_table)?;

    let mut names = Vec::new();
    let mut columns = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        match staging_column_kind(name) {
            Some(kind) => {
                names.push(name.to_string());
                columns.push(column_values(column, kind)?);
            }
            None => warn!(column = name, table = %table, "column not in staging layout, skipped"),
        }
    }

    let rows = df.height();
    if rows == 0 || names.is_empty() {
        info!(table = %table, "no rows to load");
        return Ok(0);
    }

    let rows_per_batch = (MAX_BIND_PARAMS / names.len()).max(1);
    let mut start = 0;
    while start < rows {
        let end = (start + rows_per_batch).min(rows);
        let params: Vec<SqlValue> = (start..end)
            .flat_map(|row| columns.iter().map(move |values| values[row].clone()))
            .collect();
        let sql = insert_sql(storage, &table, &names, end - start);
        storage.execute(&sql, &params).await?;
        start = end;
    }

    info!(records = rows, table = %table, "loaded staging rows");
    Ok(rows as u64)
}

/// Rows already present in `family` for `snapshot_date`.
pub async fn check_existing_data(
    storage: &dyn StorageTarget,
    adp: &AdpConfig,
    snapshot_date: NaiveDate,
    family: TableFamily,
) -> Result<i64> {
    let table = storage.resolve_table(family.configured_name(adp))?;
    let sql = format!(
        "SELECT COUNT(*) FROM {table} WHERE snapshot_date = {}",
        storage.placeholder(1)
    );
    let count = storage
        .fetch_count(&sql, &[SqlValue::Date(Some(snapshot_date))])
        .await?;
    info!(count, table = %table, snapshot_date = %snapshot_date, "existing rows");
    Ok(count)
}

/// Remove every row of `family` for `snapshot_date`; returns rows removed.
pub async fn delete_existing_data(
    storage: &dyn StorageTarget,
    adp: &AdpConfig,
    snapshot_date: NaiveDate,
    family: TableFamily,
) -> Result<u64> {
    let table = storage.resolve_table(family.configured_name(adp))?;
    let sql = format!(
        "DELETE FROM {table} WHERE snapshot_date = {}",
        storage.placeholder(1)
    );
    let deleted = storage
        .execute(&sql, &[SqlValue::Date(Some(snapshot_date))])
        .await?;
    info!(deleted, table = %table, snapshot_date = %snapshot_date, "deleted existing rows");
    Ok(deleted)
}
