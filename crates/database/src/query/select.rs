//! Query Builder SELECT operations

use super::builder::QueryBuilder;
use crate::escape::{escape_column, escape_table};

impl QueryBuilder {
    /// Set the base table, optionally aliased (`users AS u`)
    pub fn table(mut self, table: &str) -> Self {
        let table = table.trim();
        self.table = if table.is_empty() {
            None
        } else {
            Some(escape_table(table))
        };
        self
    }

    /// Replace the projection with the given columns
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|column| escape_column(column)).collect();
        self
    }

    /// Append one escaped column to the projection
    pub fn add_select(mut self, column: &str) -> Self {
        self.columns.push(escape_column(column));
        self
    }

    /// Append a raw expression to the projection
    pub fn select_raw(mut self, expression: &str) -> Self {
        self.columns.push(expression.to_string());
        self
    }

    /// Add DISTINCT to the query
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}
