// crates/foreflow-core/src/db.rs

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{PgPool, Postgres, Sqlite, SqlitePool};
use tracing::info;

use crate::config::{DatabaseConfig, DatabaseEngine};
use crate::error::{PipelineError, Result};

/// Logical column types shared by the DDL and the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    DepartmentCode,
    Date,
    Integer,
    Decimal,
    Timestamp,
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Integer(Option<i64>),
    Decimal(Option<f64>),
    Timestamp(Option<NaiveDateTime>),
}

/// The storage engine a run writes to. One implementation per engine family;
/// everything above this trait is engine-agnostic SQL.
#[async_trait]
pub trait StorageTarget: Send + Sync {
    fn engine(&self) -> DatabaseEngine;

    /// Turn a configured table name (`bronze.adp_tenure_history`) into the
    /// identifier this engine addresses it by.
    fn resolve_table(&self, configured: &str) -> Result<String>;

    /// Positional placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    fn column_type(&self, kind: ColumnKind) -> &'static str;

    /// Run a statement and return the number of rows it affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Run a statement returning a single integer in its first column.
    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64>;

    /// Release the connection. Called once at the end of every run.
    async fn close(&self);
}

/// Bind `params` in order onto a `query` or `query_scalar` builder.
macro_rules! bind_all {
    ($query:expr, $params:expr) => {{
        let mut query = $query;
        for value in $params {
            query = match value {
                SqlValue::Text(v) => query.bind(v.as_deref()),
                SqlValue::Date(v) => query.bind(*v),
                SqlValue::Integer(v) => query.bind(*v),
                SqlValue::Decimal(v) => query.bind(*v),
                SqlValue::Timestamp(v) => query.bind(*v),
            };
        }
        query
    }};
}

/// Open a single-connection target for one pipeline run.
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn StorageTarget>> {
    let url = config.url()?;
    match config.engine {
        DatabaseEngine::Postgres => Ok(Box::new(PostgresTarget::connect(&url).await?)),
        DatabaseEngine::Sqlite => Ok(Box::new(SqliteTarget::connect(&url).await?)),
    }
}

fn validate_identifier(configured: &str) -> Result<()> {
    let valid = !configured.is_empty()
        && configured.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !segment.starts_with(|c: char| c.is_ascii_digit())
        });
    if valid {
        Ok(())
    } else {
        Err(PipelineError::Config(format!(
            "invalid table identifier '{configured}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PostgresTarget {
    pool: PgPool,
}

impl PostgresTarget {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        info!(engine = "postgresql", "database connection established");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageTarget for PostgresTarget {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Postgres
    }

    fn resolve_table(&self, configured: &str) -> Result<String> {
        validate_identifier(configured)?;
        Ok(configured.to_string())
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::Text => "TEXT",
            ColumnKind::DepartmentCode => "VARCHAR(6)",
            ColumnKind::Date => "DATE",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Decimal => "DOUBLE PRECISION",
            ColumnKind::Timestamp => "TIMESTAMP",
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let query = bind_all!(sqlx::query::<Postgres>(sql), params);
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        let query = bind_all!(sqlx::query_scalar::<Postgres, i64>(sql), params);
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SqliteTarget {
    pool: SqlitePool,
}

impl SqliteTarget {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A single connection that never idles out, so `sqlite::memory:` keeps
        // its contents for the whole run.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        info!(engine = "sqlite", "database connection established");
        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }
}

#[async_trait]
impl StorageTarget for SqliteTarget {
    fn engine(&self) -> DatabaseEngine {
        DatabaseEngine::Sqlite
    }

    /// SQLite has no schemas here; `bronze.adp_tenure_history` is addressed as
    /// `adp_tenure_history`.
    fn resolve_table(&self, configured: &str) -> Result<String> {
        validate_identifier(configured)?;
        Ok(configured
            .rsplit('.')
            .next()
            .unwrap_or(configured)
            .to_string())
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{index}")
    }

    fn column_type(&self, kind: ColumnKind) -> &'static str {
        match kind {
            ColumnKind::Text | ColumnKind::DepartmentCode => "TEXT",
            ColumnKind::Date | ColumnKind::Timestamp => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Decimal => "REAL",
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let query = bind_all!(sqlx::query::<Sqlite>(sql), params);
        Ok(query.execute(&self.pool).await?.rows_affected())
    }

    async fn fetch_count(&self, sql: &str, params: &[SqlValue]) -> Result<i64> {
        let query = bind_all!(sqlx::query_scalar::<Sqlite, i64>(sql), params);
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
