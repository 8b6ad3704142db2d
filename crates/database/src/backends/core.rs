//! Core Database Backend Traits
//!
//! The query builder needs a single capability from the outside world: run
//! SQL text with positional bindings and hand back rows or write metadata.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{DatabaseError, DatabaseResult};
use crate::value::DatabaseValue;

/// Execution gateway for rendered statements
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a query and return the result rows
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>>;

    /// Execute a statement and return its write metadata
    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult>;
}

#[async_trait]
impl<'a, T: QueryExecutor + ?Sized> QueryExecutor for &'a T {
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        (**self).fetch_all(sql, bindings).await
    }

    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        (**self).execute(sql, bindings).await
    }
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        (**self).fetch_all(sql, bindings).await
    }

    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        (**self).execute(sql, bindings).await
    }
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Box<T> {
    async fn fetch_all(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<Vec<DatabaseRow>> {
        (**self).fetch_all(sql, bindings).await
    }

    async fn execute(&self, sql: &str, bindings: &[DatabaseValue]) -> DatabaseResult<ExecuteResult> {
        (**self).execute(sql, bindings).await
    }
}

/// Write metadata reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteResult {
    pub rows_affected: u64,
    /// `None` when the statement generated no auto-increment id
    pub last_insert_id: Option<u64>,
}

/// One result row as ordered `(column, value)` pairs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatabaseRow {
    columns: Vec<(String, DatabaseValue)>,
}

impl DatabaseRow {
    pub fn new(columns: Vec<(String, DatabaseValue)>) -> Self {
        Self { columns }
    }

    /// Get a column value by name
    pub fn get_value(&self, column: &str) -> Option<&DatabaseValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Get a column value by index
    pub fn get_by_index(&self, index: usize) -> Option<&DatabaseValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a typed value from a column
    pub fn get<T: DeserializeOwned>(&self, column: &str) -> DatabaseResult<T> {
        let value = self
            .get_value(column)
            .ok_or_else(|| DatabaseError::decode(column, "column not found"))?;
        serde_json::from_value(value.to_json())
            .map_err(|e| DatabaseError::decode(column, e.to_string()))
    }

    /// Get an optional typed value; missing and NULL columns yield `None`
    pub fn try_get<T: DeserializeOwned>(&self, column: &str) -> DatabaseResult<Option<T>> {
        match self.get_value(column) {
            None | Some(DatabaseValue::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.to_json())
                .map(Some)
                .map_err(|e| DatabaseError::decode(column, e.to_string())),
        }
    }

    /// Convert row to JSON object
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        JsonValue::Object(map)
    }

    /// Deserialize the whole row into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> DatabaseResult<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    pub fn into_columns(self) -> Vec<(String, DatabaseValue)> {
        self.columns
    }
}

impl<K, V> FromIterator<(K, V)> for DatabaseRow
where
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        id: i64,
        name: String,
        nickname: Option<String>,
    }

    fn row() -> DatabaseRow {
        [
            ("id", DatabaseValue::Int(1)),
            ("name", DatabaseValue::from("Joe")),
            ("nickname", DatabaseValue::Null),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_typed_column_access() {
        let row = row();
        assert_eq!(row.get::<i64>("id").unwrap(), 1);
        assert_eq!(row.get::<String>("name").unwrap(), "Joe");
        assert_eq!(row.try_get::<String>("nickname").unwrap(), None);
        assert_eq!(row.try_get::<String>("missing").unwrap(), None);
    }

    #[test]
    fn test_missing_column_is_decode_error() {
        let err = row().get::<i64>("missing").unwrap_err();
        assert!(matches!(err, DatabaseError::Decode { column, .. } if column == "missing"));
    }

    #[test]
    fn test_whole_row_deserialization() {
        let user: User = row().deserialize().unwrap();
        assert_eq!(
            user,
            User {
                id: 1,
                name: "Joe".to_string(),
                nickname: None,
            }
        );
        assert_eq!(row().column_names(), vec!["id", "name", "nickname"]);
    }
}
