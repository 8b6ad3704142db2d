//! Query Builder execution through a [`QueryExecutor`]
//!
//! Every terminal operation renders first and issues exactly one statement
//! per call (`insert` issues one per record). Precondition errors are raised
//! before the executor is touched.

use super::builder::QueryBuilder;
use super::dml::into_record;
use super::sql_generation::AGGREGATE_ALIAS;
use crate::backends::core::{DatabaseRow, QueryExecutor};
use crate::error::{DatabaseError, DatabaseResult};
use crate::value::DatabaseValue;

impl QueryBuilder {
    /// Execute the SELECT and return all rows.
    ///
    /// A non-empty `columns` slice overrides the projection for this call only.
    pub async fn get<E>(&self, db: &E, columns: &[&str]) -> DatabaseResult<Vec<DatabaseRow>>
    where
        E: QueryExecutor + ?Sized,
    {
        let query = if columns.is_empty() {
            self.build_select()?
        } else {
            self.clone().select(columns).build_select()?
        };
        db.fetch_all(&query.sql, &query.bindings).await
    }

    /// Execute the SELECT with `LIMIT 1 OFFSET 0` and return the first row
    pub async fn first<E>(&self, db: &E, columns: &[&str]) -> DatabaseResult<Option<DatabaseRow>>
    where
        E: QueryExecutor + ?Sized,
    {
        let rows = self.clone().limit(1).get(db, columns).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one record and return its auto-increment id, or `-1` when the
    /// driver reports none
    pub async fn insert_get_id<E, I, K, V>(&self, db: &E, record: I) -> DatabaseResult<i64>
    where
        E: QueryExecutor + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        let query = self.build_insert(record)?;
        let result = db.execute(&query.sql, &query.bindings).await?;
        Ok(result
            .last_insert_id
            .and_then(|id| i64::try_from(id).ok())
            .unwrap_or(-1))
    }

    /// Insert records one statement at a time.
    ///
    /// The first failure aborts; records inserted before it stay committed.
    pub async fn insert<E, R, I, K, V>(&self, db: &E, records: R) -> DatabaseResult<()>
    where
        E: QueryExecutor + ?Sized,
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        self.checked_table()?;
        for record in records {
            self.insert_get_id(db, into_record(record)).await?;
        }
        Ok(())
    }

    /// Update matching rows and return the affected row count
    pub async fn update<E, I, K, V>(&self, db: &E, values: I) -> DatabaseResult<u64>
    where
        E: QueryExecutor + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        let query = self.build_update(values)?;
        let result = db.execute(&query.sql, &query.bindings).await?;
        Ok(result.rows_affected)
    }

    /// Delete matching rows and return the affected row count
    pub async fn delete<E>(&self, db: &E) -> DatabaseResult<u64>
    where
        E: QueryExecutor + ?Sized,
    {
        let query = self.build_delete()?;
        let result = db.execute(&query.sql, &query.bindings).await?;
        Ok(result.rows_affected)
    }

    /// `COUNT(column)` or `COUNT(*)`
    pub async fn count<E>(&self, db: &E, column: Option<&str>) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        self.aggregate(db, "COUNT", column).await
    }

    pub async fn min<E>(&self, db: &E, column: &str) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        self.aggregate(db, "MIN", Some(column)).await
    }

    pub async fn max<E>(&self, db: &E, column: &str) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        self.aggregate(db, "MAX", Some(column)).await
    }

    pub async fn avg<E>(&self, db: &E, column: &str) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        self.aggregate(db, "AVG", Some(column)).await
    }

    pub async fn sum<E>(&self, db: &E, column: &str) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        self.aggregate(db, "SUM", Some(column)).await
    }

    /// Run `FUNC(column) AS aggregate`; no row or a NULL result yields 0
    async fn aggregate<E>(&self, db: &E, function: &str, column: Option<&str>) -> DatabaseResult<f64>
    where
        E: QueryExecutor + ?Sized,
    {
        const DEFAULT: f64 = 0.0;

        let query = self.build_aggregate(function, column)?;
        let rows = db.fetch_all(&query.sql, &query.bindings).await?;

        let value = match rows.first().and_then(|row| row.get_value(AGGREGATE_ALIAS)) {
            None | Some(DatabaseValue::Null) => return Ok(DEFAULT),
            Some(value) => value,
        };

        value.as_f64().ok_or_else(|| {
            DatabaseError::decode(
                AGGREGATE_ALIAS,
                format!("expected a numeric aggregate, got {:?}", value),
            )
        })
    }
}
