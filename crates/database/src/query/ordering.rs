//! Query Builder ORDER BY, GROUP BY, HAVING operations

use super::builder::QueryBuilder;
use super::conditions::HavingClause;
use super::types::{ConditionOperator, OrderBy, OrderClause, OrderDirection};
use crate::value::DatabaseValue;
use crate::escape::escape_column;

impl QueryBuilder {
    /// Add ORDER BY clause
    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.orders.push(OrderClause::Column(OrderBy {
            column: escape_column(column),
            direction,
        }));
        self
    }

    /// Add ORDER BY clause (descending)
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, OrderDirection::Desc)
    }

    /// Add a raw ORDER BY expression such as `FIELD(status, 'a', 'b')`
    pub fn order_by_raw(mut self, sql: &str) -> Self {
        self.orders.push(OrderClause::Raw(sql.trim().to_string()));
        self
    }

    /// Add GROUP BY clause
    pub fn group_by(mut self, column: &str) -> Self {
        self.groups.push(escape_column(column));
        self
    }

    pub fn group_by_raw(mut self, sql: &str) -> Self {
        self.groups.push(sql.trim().to_string());
        self
    }

    /// Add HAVING condition
    pub fn having<V: Into<DatabaseValue>>(mut self, column: &str, operator: &str, value: V) -> Self {
        match operator.parse::<ConditionOperator>() {
            Ok(operator) => self.havings.push(HavingClause::Structured {
                column: column.to_string(),
                operator,
                value: value.into(),
            }),
            Err(err) => self.fail(err),
        }
        self
    }

    pub fn having_raw(self, sql: &str) -> Self {
        self.having_raw_with(sql, Vec::<DatabaseValue>::new())
    }

    pub fn having_raw_with<I, V>(mut self, sql: &str, bindings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        self.havings.push(HavingClause::Raw {
            sql: sql.to_string(),
            bindings: bindings.into_iter().map(Into::into).collect(),
        });
        self
    }
}
