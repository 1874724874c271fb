//! Query execution
//!
//! The agent only depends on [`QueryExecutor`]; [`PostgresExecutor`] is the
//! production implementation.

pub mod postgres;
pub mod types;

use async_trait::async_trait;

pub use postgres::PostgresExecutor;
pub use types::{ColumnSchema, DatabaseConfig, DatabaseError, ExecutionResult, Row};

/// Runs one SQL statement and reports its result
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<ExecutionResult, DatabaseError>;

    /// Health check
    async fn is_connected(&self) -> bool;

    /// Releases pooled connections; later calls fail
    async fn close(&self) {}
}
