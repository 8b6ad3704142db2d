//! MySQL Backend Implementation
//!
//! Runs rendered statements on a sqlx MySQL pool and converts result columns
//! into [`DatabaseValue`]s.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use super::core::{DatabaseRow, ExecuteResult, QueryExecutor};
use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DatabaseResult};
use crate::value::DatabaseValue;

/// Query executor backed by a sqlx MySQL pool
#[derive(Debug, Clone)]
pub struct MySqlExecutor {
    pool: MySqlPool,
}

impl MySqlExecutor {
    /// Wrap an existing pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create a pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        config.validate()?;

        let pool_config = &config.pool;
        tracing::debug!(
            "Creating MySQL pool for {}:{}/{}: max={}, min={}, timeout={}s, idle_timeout={:?}s, max_lifetime={:?}s",
            config.host,
            config.port,
            config.database,
            pool_config.max_connections,
            pool_config.min_connections,
            pool_config.acquire_timeout,
            pool_config.idle_timeout,
            pool_config.max_lifetime
        );

        let mut connect_options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .database(&config.database);
        if let Some(password) = &config.password {
            connect_options = connect_options.password(password);
        }

        let mut options = MySqlPoolOptions::new()
            .max_connections(pool_config.max_connections)
            .min_connections(pool_config.min_connections)
            .acquire_timeout(Duration::from_secs(pool_config.acquire_timeout))
            .test_before_acquire(pool_config.test_before_acquire);

        if let Some(idle_timeout) = pool_config.idle_timeout {
            options = options.idle_timeout(Duration::from_secs(idle_timeout));
        }

        if let Some(max_lifetime) = pool_config.max_lifetime {
            options = options.max_lifetime(Duration::from_secs(max_lifetime));
        }

        let pool = options.connect_with(connect_options).await.map_err(|e| {
            tracing::error!("Failed to create MySQL pool: {}", e);
            DatabaseError::Connection(e.to_string())
        })?;

        tracing::debug!("MySQL pool created with {} max connections", pool_config.max_connections);
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        tracing::debug!(sql = %sql, bindings = bindings.len(), "fetching rows");

        let mut query = sqlx::query(sql);
        for value in bindings {
            query = bind_database_value(query, value);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Query fetch failed: {}", e);
            DatabaseError::from(e)
        })?;

        rows.iter().map(mysql_row_to_database_row).collect()
    }

    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        tracing::debug!(sql = %sql, bindings = bindings.len(), "executing statement");

        let mut query = sqlx::query(sql);
        for value in bindings {
            query = bind_database_value(query, value);
        }

        let result = query.execute(&self.pool).await.map_err(|e| {
            tracing::error!("Query execution failed: {}", e);
            DatabaseError::from(e)
        })?;

        let last_insert_id = match result.last_insert_id() {
            0 => None,
            id => Some(id),
        };

        Ok(ExecuteResult {
            rows_affected: result.rows_affected(),
            last_insert_id,
        })
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int(i) => query.bind(*i),
        DatabaseValue::UInt(u) => query.bind(*u),
        DatabaseValue::Float(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

fn mysql_row_to_database_row(row: &MySqlRow) -> DatabaseResult<DatabaseRow> {
    let mut columns = Vec::with_capacity(row.len());
    for (index, column) in row.columns().iter().enumerate() {
        columns.push((column.name().to_string(), mysql_value_to_database_value(row, index)?));
    }
    Ok(DatabaseRow::new(columns))
}

/// Convert a MySQL column value to DatabaseValue
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> DatabaseResult<DatabaseValue> {
    let column = &row.columns()[index];
    let name = column.name();
    let type_name = column.type_info().name();

    let decode_error = |e: sqlx::Error| DatabaseError::decode(name, e.to_string());

    if row.try_get_raw(index).map_err(decode_error)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let value = match type_name {
        "BOOLEAN" => DatabaseValue::Bool(row.try_get_unchecked::<bool, _>(index).map_err(decode_error)?),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" | "BIT" => {
            DatabaseValue::UInt(row.try_get_unchecked::<u64, _>(index).map_err(decode_error)?)
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            DatabaseValue::Int(row.try_get_unchecked::<i64, _>(index).map_err(decode_error)?)
        }
        "FLOAT" => DatabaseValue::Float(row.try_get_unchecked::<f32, _>(index).map_err(decode_error)? as f64),
        "DOUBLE" => DatabaseValue::Float(row.try_get_unchecked::<f64, _>(index).map_err(decode_error)?),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
            DatabaseValue::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index).map_err(decode_error)?)
        }
        "DATETIME" | "TIMESTAMP" => {
            DatabaseValue::DateTime(row.try_get_unchecked::<NaiveDateTime, _>(index).map_err(decode_error)?)
        }
        "DATE" => DatabaseValue::Date(row.try_get_unchecked::<NaiveDate, _>(index).map_err(decode_error)?),
        "TIME" => DatabaseValue::Time(row.try_get_unchecked::<NaiveTime, _>(index).map_err(decode_error)?),
        "JSON" => DatabaseValue::Json(row.try_get_unchecked::<JsonValue, _>(index).map_err(decode_error)?),
        // DECIMAL arrives as text; keep it exact and let callers parse
        _ => DatabaseValue::String(row.try_get_unchecked::<String, _>(index).map_err(decode_error)?),
    };

    Ok(value)
}
