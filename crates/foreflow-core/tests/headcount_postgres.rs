mod support;

use std::env;

use anyhow::Result;
use chrono::NaiveDate;
use foreflow_core::config::AdpConfig;
use foreflow_core::dates::MondayPair;
use foreflow_core::db::{PostgresTarget, StorageTarget};
use foreflow_core::headcount::load::check_existing_data;
use foreflow_core::headcount::pipeline::{run_pipeline, PipelineOutcome, RunOptions};
use foreflow_core::headcount::TableFamily;
use foreflow_core::schema::ensure_schema;
use tokio::runtime::Runtime;

#[test]
fn forced_reload_is_idempotent_on_postgres() -> Result<()> {
    let database_url = match env::var("FOREFLOW_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping forced_reload_is_idempotent_on_postgres because FOREFLOW_TEST_DATABASE_URL is not set"
            );
            return Ok(());
        }
    };

    let dir = tempfile::tempdir()?;
    let file = dir.path().join("tenure.xlsx");
    support::write_tenure_workbook(&file, &support::tenure_rows())?;

    let adp = AdpConfig {
        bronze_table: "foreflow_test.adp_tenure_history".to_string(),
        silver_table: "foreflow_test.fact_active_headcount".to_string(),
        ..AdpConfig::default()
    };
    let week = MondayPair {
        snapshot_date: NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
        report_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
    };

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let storage = PostgresTarget::connect(&database_url).await?;
        ensure_schema(&storage, &adp).await?;
        storage
            .execute("TRUNCATE TABLE foreflow_test.adp_tenure_history", &[])
            .await?;
        storage
            .execute("TRUNCATE TABLE foreflow_test.fact_active_headcount", &[])
            .await?;

        let force = RunOptions {
            force: true,
            ..RunOptions::default()
        };
        let first = run_pipeline(&storage, &adp, &file, week, force).await?;
        let second = run_pipeline(&storage, &adp, &file, week, force).await?;
        assert_eq!(first, second);
        assert_eq!(
            second,
            PipelineOutcome::Completed {
                staging_rows: 8,
                summary_rows: Some(2),
            }
        );

        let skipped = run_pipeline(&storage, &adp, &file, week, RunOptions::default()).await?;
        assert!(matches!(skipped, PipelineOutcome::Skipped { .. }));

        let summary =
            check_existing_data(&storage, &adp, week.snapshot_date, TableFamily::Summary).await?;
        assert_eq!(summary, 2);

        storage.close().await;
        Ok::<(), anyhow::Error>(())
    })
}
