//! PostgreSQL executor backed by an sqlx pool

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    Column, Row as _, ValueRef,
};
use tracing::{debug, info};

use super::types::{ColumnSchema, DatabaseConfig, DatabaseError, ExecutionResult, Row};
use super::QueryExecutor;

/// Leading keywords of statements that produce a result set
const ROW_RETURNING_KEYWORDS: [&str; 6] = ["SELECT", "WITH", "SHOW", "VALUES", "TABLE", "EXPLAIN"];

/// True when the statement yields rows rather than an affected-row count
pub fn returns_rows(sql: &str) -> bool {
    let leading = sql
        .trim_start()
        .trim_start_matches('(')
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();

    ROW_RETURNING_KEYWORDS
        .iter()
        .any(|keyword| leading.eq_ignore_ascii_case(keyword))
        || sql
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .any(|word| word.eq_ignore_ascii_case("RETURNING"))
}

/// Executes statements against PostgreSQL
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    /// Connects eagerly; fails when the server is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        config.validate()?;

        let pool = Self::pool_options(config)
            .connect(&config.connection_string())
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        info!(host = %config.host, database = %config.name, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Creates the pool without opening a connection
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        config.validate()?;

        let pool = Self::pool_options(config)
            .connect_lazy(&config.connection_string())
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        Ok(Self { pool })
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
    }

    /// Runs `SELECT 1`
    pub async fn test_connection(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(())
    }

    /// Base tables in the `public` schema
    pub async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>(0).map_err(DatabaseError::from))
            .collect()
    }

    /// Column layout of a `public` table
    pub async fn table_schema(&self, table: &str) -> Result<Vec<ColumnSchema>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT column_name, data_type, is_nullable, column_default
             FROM information_schema.columns
             WHERE table_name = $1 AND table_schema = 'public'
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Err(DatabaseError::TableNotFound(table.to_string()));
        }

        rows.iter()
            .map(|row| -> Result<ColumnSchema, DatabaseError> {
                let is_nullable: String = row.try_get(2)?;
                Ok(ColumnSchema {
                    name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    nullable: is_nullable == "YES",
                    default: row.try_get(3)?,
                })
            })
            .collect()
    }

    fn row_to_json(row: &PgRow) -> Row {
        row.columns()
            .iter()
            .enumerate()
            .map(|(i, column)| (column.name().to_string(), Self::extract_value(row, i)))
            .collect()
    }

    /// Decodes one column, trying the common PostgreSQL types in turn
    fn extract_value(row: &PgRow, index: usize) -> Value {
        match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Err(_) => return Value::Null,
            _ => {}
        }

        if let Ok(v) = row.try_get::<bool, _>(index) {
            return Value::Bool(v);
        }
        if let Ok(v) = row.try_get::<i16, _>(index) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<i32, _>(index) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<i64, _>(index) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<f32, _>(index) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<f64, _>(index) {
            return Value::from(v);
        }
        if let Ok(v) = row.try_get::<String, _>(index) {
            return Value::String(v);
        }
        if let Ok(v) = row.try_get::<Value, _>(index) {
            return v;
        }
        if let Ok(v) = row.try_get::<uuid::Uuid, _>(index) {
            return Value::String(v.to_string());
        }
        if let Ok(v) = row.try_get::<DateTime<Utc>, _>(index) {
            return Value::String(v.to_rfc3339());
        }
        if let Ok(v) = row.try_get::<NaiveDateTime, _>(index) {
            return Value::String(v.to_string());
        }
        if let Ok(v) = row.try_get::<NaiveDate, _>(index) {
            return Value::String(v.to_string());
        }
        if let Ok(v) = row.try_get::<NaiveTime, _>(index) {
            return Value::String(v.to_string());
        }
        if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
            return Value::String(STANDARD.encode(v));
        }

        Value::Null
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn execute(&self, sql: &str) -> Result<ExecutionResult, DatabaseError> {
        if returns_rows(sql) {
            let rows = sqlx::query(sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            debug!(rows = rows.len(), "query returned rows");
            Ok(ExecutionResult::Rows(
                rows.iter().map(Self::row_to_json).collect(),
            ))
        } else {
            let result = sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            debug!(affected_rows = result.rows_affected(), "statement executed");
            Ok(ExecutionResult::Affected {
                affected_rows: result.rows_affected(),
            })
        }
    }

    async fn is_connected(&self) -> bool {
        !self.pool.is_closed() && self.test_connection().await.is_ok()
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}
