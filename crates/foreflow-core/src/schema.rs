//! Column layout of the staging (bronze) and summary (silver) tables.
//!
//! Names and order are relied on by downstream consumers; do not rename.

use tracing::info;

use crate::config::{AdpConfig, DatabaseEngine};
use crate::db::{ColumnKind, StorageTarget};
use crate::error::Result;

pub const STAGING_COLUMNS: [(&str, ColumnKind); 31] = [
    ("file_number", ColumnKind::Text),
    ("payroll_name", ColumnKind::Text),
    ("hire_date", ColumnKind::Date),
    ("rehire_date", ColumnKind::Date),
    ("previous_termination_date", ColumnKind::Date),
    ("termination_date", ColumnKind::Date),
    ("termination_reason", ColumnKind::Text),
    ("position_status", ColumnKind::Text),
    ("leave_of_absence_start_date", ColumnKind::Text),
    ("leave_of_absence_return_date", ColumnKind::Text),
    ("home_department_code", ColumnKind::DepartmentCode),
    ("home_department_description", ColumnKind::Text),
    ("payroll_company_code", ColumnKind::Text),
    ("position_id", ColumnKind::Text),
    ("client_code", ColumnKind::Text),
    ("client", ColumnKind::Text),
    ("regular_pay_rate", ColumnKind::Decimal),
    ("recruited_by", ColumnKind::Text),
    ("business_unit", ColumnKind::Text),
    ("requisition_key", ColumnKind::Text),
    ("email", ColumnKind::Text),
    ("adp_id", ColumnKind::Text),
    ("requisition_id", ColumnKind::Integer),
    ("applicant_id", ColumnKind::Integer),
    ("regular_hours", ColumnKind::Decimal),
    ("ot_hours", ColumnKind::Decimal),
    ("pto_sick_hours", ColumnKind::Decimal),
    ("holiday_hours", ColumnKind::Decimal),
    ("voluntary_involuntary_flag", ColumnKind::Text),
    ("home_phone", ColumnKind::Text),
    ("snapshot_date", ColumnKind::Date),
];

pub const SUMMARY_COLUMNS: [(&str, ColumnKind); 5] = [
    ("department_number", ColumnKind::DepartmentCode),
    ("snapshot_date", ColumnKind::Date),
    ("report_date", ColumnKind::Date),
    ("active_count", ColumnKind::Integer),
    ("created_at", ColumnKind::Timestamp),
];

pub fn staging_column_kind(name: &str) -> Option<ColumnKind> {
    STAGING_COLUMNS
        .iter()
        .find(|(column, _)| *column == name)
        .map(|(_, kind)| *kind)
}

fn create_table_sql(
    storage: &dyn StorageTarget,
    table: &str,
    columns: &[(&str, ColumnKind)],
) -> String {
    let body = columns
        .iter()
        .map(|(name, kind)| format!("    {name} {}", storage.column_type(*kind)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS {table} (\n{body}\n)")
}

/// Create the staging and summary tables (and their Postgres schemas) when absent.
pub async fn ensure_schema(storage: &dyn StorageTarget, adp: &AdpConfig) -> Result<()> {
    let bronze = storage.resolve_table(&adp.bronze_table)?;
    let silver = storage.resolve_table(&adp.silver_table)?;

    if storage.engine() == DatabaseEngine::Postgres {
        for table in [&bronze, &silver] {
            if let Some((schema, _)) = table.split_once('.') {
                storage
                    .execute(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"), &[])
                    .await?;
            }
        }
    }

    storage
        .execute(&create_table_sql(storage, &bronze, &STAGING_COLUMNS), &[])
        .await?;
    storage
        .execute(&create_table_sql(storage, &silver, &SUMMARY_COLUMNS), &[])
        .await?;

    info!(staging = %bronze, summary = %silver, "schema ensured");
    Ok(())
}
