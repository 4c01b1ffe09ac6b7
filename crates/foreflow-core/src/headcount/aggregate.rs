use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::config::AdpConfig;
use crate::db::{SqlValue, StorageTarget};
use crate::error::Result;

/// Build the staging → summary statement.
///
/// Parameters: 1 = snapshot date, 2 = report date, 3 = load timestamp,
/// 4.. = excluded client codes. A NULL `client_code` never satisfies
/// `NOT IN`, so such rows are excluded whenever the list is non-empty.
pub fn headcount_sql(
    storage: &dyn StorageTarget,
    bronze: &str,
    silver: &str,
    excluded_codes: usize,
) -> String {
    let snapshot = storage.placeholder(1);
    let report = storage.placeholder(2);
    let created_at = storage.placeholder(3);

    let exclusion = if excluded_codes == 0 {
        String::new()
    } else {
        let placeholders = (0..excluded_codes)
            .map(|idx| storage.placeholder(idx + 4))
            .collect::<Vec<_>>()
            .join(", ");
        format!("\n          AND b.client_code NOT IN ({placeholders})")
    };

    format!(
        "INSERT INTO {silver} (department_number, snapshot_date, report_date, active_count, created_at)
SELECT a.home_department_code, {snapshot}, {report}, a.active_count, {created_at}
FROM (
    SELECT COUNT(DISTINCT b.adp_id) AS active_count,
           b.home_department_code,
           b.home_department_description
    FROM {bronze} b
    WHERE b.position_status = 'Active'
          AND b.file_number IS NOT NULL{exclusion}
          AND COALESCE(b.rehire_date, b.hire_date) < b.snapshot_date
          AND b.snapshot_date = {snapshot}
    GROUP BY b.home_department_code, b.home_department_description
) a
WHERE a.home_department_code IS NOT NULL"
    )
}

/// Count distinct active associates per department for `snapshot_date` and
/// append them to the summary table. Returns the rows inserted.
pub async fn execute_headcount_calculation(
    storage: &dyn StorageTarget,
    adp: &AdpConfig,
    snapshot_date: NaiveDate,
    report_date: NaiveDate,
) -> Result<u64> {
    let bronze = storage.resolve_table(&adp.bronze_table)?;
    let silver = storage.resolve_table(&adp.silver_table)?;
    let sql = headcount_sql(storage, &bronze, &silver, adp.excluded_client_codes.len());

    let mut params = vec![
        SqlValue::Date(Some(snapshot_date)),
        SqlValue::Date(Some(report_date)),
        SqlValue::Timestamp(Some(Utc::now().naive_utc())),
    ];
    params.extend(
        adp.excluded_client_codes
            .iter()
            .map(|code| SqlValue::Text(Some(code.clone()))),
    );

    let inserted = storage.execute(&sql, &params).await?;
    info!(
        inserted,
        table = %silver,
        snapshot_date = %snapshot_date,
        "headcount calculation complete"
    );
    Ok(inserted)
}
