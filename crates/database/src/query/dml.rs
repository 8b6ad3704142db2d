//! Query Builder DML operations (INSERT, UPDATE, DELETE)
//!
//! Records are ordered `(column, value)` pairs; columns render in the order
//! the record yields them.

use super::builder::QueryBuilder;
use super::types::BoundQuery;
use crate::error::{DatabaseError, DatabaseResult};
use crate::escape::escape_column;
use crate::value::DatabaseValue;

/// Ordered column/value pairs
pub type Record = Vec<(String, DatabaseValue)>;

/// Collect any `(column, value)` iterator into a [`Record`]
pub fn into_record<I, K, V>(values: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    values
        .into_iter()
        .map(|(column, value)| (column.into(), value.into()))
        .collect()
}

impl QueryBuilder {
    /// Render `INSERT INTO table (cols) VALUES (?, ...)`
    pub fn build_insert<I, K, V>(&self, record: I) -> DatabaseResult<BoundQuery>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        let table = self.checked_table()?;
        let record = into_record(record);

        let columns: Vec<String> = record.iter().map(|(column, _)| escape_column(column)).collect();
        let placeholders = vec!["?"; record.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );

        Ok(BoundQuery::new(
            sql,
            record.into_iter().map(|(_, value)| value).collect(),
        ))
    }

    /// Render `UPDATE table SET col = ?, ... WHERE ...`
    pub fn build_update<I, K, V>(&self, values: I) -> DatabaseResult<BoundQuery>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        let table = self.checked_table()?;
        let values = into_record(values);
        if values.is_empty() {
            return Err(DatabaseError::EmptyUpdate);
        }

        let assignments: Vec<String> = values
            .iter()
            .map(|(column, _)| format!("{} = ?", escape_column(column)))
            .collect();
        let mut sql = format!("UPDATE {} SET {}", table, assignments.join(", "));
        let mut bindings: Vec<DatabaseValue> = values.into_iter().map(|(_, value)| value).collect();

        let conditions = self.build_where()?;
        if !conditions.is_empty() {
            sql.push(' ');
            sql.push_str(&conditions.sql);
            bindings.extend(conditions.bindings);
        }

        Ok(BoundQuery::new(sql, bindings))
    }

    /// Render `DELETE FROM table WHERE ...`
    pub fn build_delete(&self) -> DatabaseResult<BoundQuery> {
        let table = self.checked_table()?;
        let mut sql = format!("DELETE FROM {}", table);

        let conditions = self.build_where()?;
        if !conditions.is_empty() {
            sql.push(' ');
            sql.push_str(&conditions.sql);
        }

        Ok(BoundQuery::new(sql, conditions.bindings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::where_clause::WhereClauses;

    #[test]
    fn test_insert_keeps_record_order() {
        let query = QueryBuilder::new()
            .table("users")
            .build_insert([("name", DatabaseValue::from("Joe")), ("age", DatabaseValue::from(30))])
            .unwrap();
        assert_eq!(query.sql, "INSERT INTO `users` (`name`, `age`) VALUES (?, ?)");
        assert_eq!(
            query.bindings,
            vec![DatabaseValue::from("Joe"), DatabaseValue::Int(30)]
        );
    }

    #[test]
    fn test_insert_requires_table() {
        let err = QueryBuilder::new()
            .build_insert([("name", "Joe")])
            .unwrap_err();
        assert!(matches!(err, DatabaseError::TableNotSet));
        assert_eq!(err.to_string(), "The table is not set.");
    }

    #[test]
    fn test_update_assignments_are_comma_separated() {
        let query = QueryBuilder::new()
            .table("users")
            .where_("id", "=", 5)
            .build_update([("name", DatabaseValue::from("Ann")), ("nickname", DatabaseValue::Null)])
            .unwrap();
        assert_eq!(query.sql, "UPDATE `users` SET `name` = ?, `nickname` = ? WHERE `id` = ?");
        assert_eq!(
            query.bindings,
            vec![DatabaseValue::from("Ann"), DatabaseValue::Null, DatabaseValue::Int(5)]
        );
    }

    #[test]
    fn test_update_without_values_is_rejected() {
        let err = QueryBuilder::new()
            .table("users")
            .build_update(Vec::<(String, DatabaseValue)>::new())
            .unwrap_err();
        assert!(matches!(err, DatabaseError::EmptyUpdate));
    }

    #[test]
    fn test_delete_with_and_without_conditions() {
        let query = QueryBuilder::new().table("users").build_delete().unwrap();
        assert_eq!(query.sql, "DELETE FROM `users`");

        let query = QueryBuilder::new()
            .table("users")
            .where_in("id", [1, 2, 3])
            .build_delete()
            .unwrap();
        assert_eq!(query.sql, "DELETE FROM `users` WHERE `id` IN (?, ?, ?)");
        assert_eq!(query.bindings.len(), 3);
    }

    #[test]
    fn test_update_requires_table_before_values() {
        let err = QueryBuilder::new()
            .build_update(Vec::<(String, DatabaseValue)>::new())
            .unwrap_err();
        assert!(matches!(err, DatabaseError::TableNotSet));
    }
}
