//! Database facade
//!
//! Owns an execution gateway and hands out query builders.
//!
//! ```no_run
//! use kc_database::{Database, DatabaseConfig, WhereClauses};
//!
//! # async fn run() -> kc_database::DatabaseResult<()> {
//! let db = Database::connect(&DatabaseConfig::from_env()?).await?;
//! let users = db.table("users").where_("id", "=", 1).get(&db, &["id", "name"]).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::core::{DatabaseRow, ExecuteResult, QueryExecutor};
use crate::backends::mysql::MySqlExecutor;
use crate::config::DatabaseConfig;
use crate::error::DatabaseResult;
use crate::query::{QueryBuilder, QueryEntry};
use crate::value::DatabaseValue;

/// Entry point for building and running statements
#[derive(Clone)]
pub struct Database {
    executor: Arc<dyn QueryExecutor>,
    pool: Option<MySqlExecutor>,
}

impl Database {
    /// Wrap any execution gateway
    pub fn new<E>(executor: E) -> Self
    where
        E: QueryExecutor + 'static,
    {
        Self {
            executor: Arc::new(executor),
            pool: None,
        }
    }

    /// Connect a MySQL pool using the given configuration
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        let mysql = MySqlExecutor::connect(config).await?;
        Ok(Self {
            executor: Arc::new(mysql.clone()),
            pool: Some(mysql),
        })
    }

    /// Connect using `DATABASE_URL` or the `DB_*` environment variables
    pub async fn from_env() -> DatabaseResult<Self> {
        let config = DatabaseConfig::from_env()?;
        Self::connect(&config).await
    }

    /// Start a query builder for `table`
    pub fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new().table(table)
    }

    /// Entry point for sub-query callbacks
    pub fn entry(&self) -> QueryEntry {
        QueryEntry::new()
    }

    /// Run raw SQL and return its rows
    pub async fn query(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        self.executor.fetch_all(sql, bindings).await
    }

    /// Run a raw statement and return its write metadata
    pub async fn statement(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        self.executor.execute(sql, bindings).await
    }

    /// Underlying MySQL executor when connected through [`Database::connect`]
    pub fn mysql(&self) -> Option<&MySqlExecutor> {
        self.pool.as_ref()
    }

    /// Close the connection pool, if this facade owns one
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            tracing::debug!("Closing MySQL pool");
            pool.close().await;
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryExecutor for Database {
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        self.executor.fetch_all(sql, bindings).await
    }

    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        self.executor.execute(sql, bindings).await
    }
}
