//! Query Builder JOIN operations

use std::fmt;
use std::sync::Arc;

use super::builder::QueryBuilder;
use super::conditions::ConditionTree;
use super::types::{BoundQuery, ConditionOperator, JoinKind, Logical};
use super::where_clause::WhereClauses;
use crate::error::{DatabaseError, DatabaseResult};
use crate::escape::{escape_column, escape_table};

/// Callback that populates a join's ON condition
pub type JoinCallback = Arc<dyn Fn(JoinBuilder) -> JoinBuilder + Send + Sync>;

/// One joined table
#[derive(Clone)]
pub enum Join {
    /// `KIND JOIN table ON a op b`
    Simple {
        kind: JoinKind,
        table: String,
        column_a: String,
        operator: ConditionOperator,
        column_b: String,
    },
    /// `KIND JOIN table ON (<conditions>)`, conditions built per render;
    /// an empty condition fails the render
    Callback {
        kind: JoinKind,
        table: String,
        build: JoinCallback,
    },
    /// `CROSS JOIN table`
    Cross { table: String },
}

impl Join {
    pub fn render(&self) -> DatabaseResult<BoundQuery> {
        match self {
            Join::Simple {
                kind,
                table,
                column_a,
                operator,
                column_b,
            } => Ok(BoundQuery::new(
                format!(
                    "{} {} ON {} {} {}",
                    kind,
                    escape_table(table),
                    escape_column(column_a),
                    operator,
                    escape_column(column_b)
                ),
                Vec::new(),
            )),
            Join::Callback { kind, table, build } => {
                let table = escape_table(table);
                let conditions = build(JoinBuilder::new()).to_sql()?;
                if conditions.is_empty() {
                    return Err(DatabaseError::EmptyJoinCondition(table));
                }
                Ok(BoundQuery::new(
                    format!("{} {} ON ({})", kind, table, conditions.sql),
                    conditions.bindings,
                ))
            }
            Join::Cross { table } => Ok(BoundQuery::new(
                format!("CROSS JOIN {}", escape_table(table)),
                Vec::new(),
            )),
        }
    }
}

impl fmt::Debug for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Join::Simple {
                kind,
                table,
                column_a,
                operator,
                column_b,
            } => f
                .debug_struct("Simple")
                .field("kind", kind)
                .field("table", table)
                .field("column_a", column_a)
                .field("operator", operator)
                .field("column_b", column_b)
                .finish(),
            Join::Callback { kind, table, .. } => f
                .debug_struct("Callback")
                .field("kind", kind)
                .field("table", table)
                .finish_non_exhaustive(),
            Join::Cross { table } => f.debug_struct("Cross").field("table", table).finish(),
        }
    }
}

/// Condition builder handed to callback joins
#[derive(Debug, Clone, Default)]
pub struct JoinBuilder {
    conditions: ConditionTree,
}

impl JoinBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare two columns, e.g. `on("u.id", "=", "d.user_id")`
    pub fn on(self, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.on_logical(Logical::And, column_a, operator, column_b)
    }

    pub fn or_on(self, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.on_logical(Logical::Or, column_a, operator, column_b)
    }

    fn on_logical(mut self, logical: Logical, column_a: &str, operator: &str, column_b: &str) -> Self {
        match operator.parse::<ConditionOperator>() {
            Ok(operator) => {
                let sql = format!("{} {} {}", escape_column(column_a), operator, escape_column(column_b));
                self.conditions.push_raw(logical, &sql, Vec::new());
            }
            Err(err) => self.conditions.fail(err),
        }
        self
    }

    /// Render the accumulated condition without parentheses
    pub fn to_sql(&self) -> DatabaseResult<BoundQuery> {
        self.conditions.render()
    }
}

impl WhereClauses for JoinBuilder {
    fn conditions_mut(&mut self) -> &mut ConditionTree {
        &mut self.conditions
    }
}

impl QueryBuilder {
    /// Add INNER JOIN to the query
    pub fn join(self, table: &str, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.inner_join(table, column_a, operator, column_b)
    }

    pub fn inner_join(self, table: &str, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.push_simple_join(JoinKind::Inner, table, column_a, operator, column_b)
    }

    /// Add LEFT JOIN to the query
    pub fn left_join(self, table: &str, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.push_simple_join(JoinKind::Left, table, column_a, operator, column_b)
    }

    /// Add RIGHT JOIN to the query
    pub fn right_join(self, table: &str, column_a: &str, operator: &str, column_b: &str) -> Self {
        self.push_simple_join(JoinKind::Right, table, column_a, operator, column_b)
    }

    /// Add INNER JOIN whose condition is built by `build`
    pub fn join_with<F>(self, table: &str, build: F) -> Self
    where
        F: Fn(JoinBuilder) -> JoinBuilder + Send + Sync + 'static,
    {
        self.inner_join_with(table, build)
    }

    pub fn inner_join_with<F>(self, table: &str, build: F) -> Self
    where
        F: Fn(JoinBuilder) -> JoinBuilder + Send + Sync + 'static,
    {
        self.push_callback_join(JoinKind::Inner, table, Arc::new(build))
    }

    pub fn left_join_with<F>(self, table: &str, build: F) -> Self
    where
        F: Fn(JoinBuilder) -> JoinBuilder + Send + Sync + 'static,
    {
        self.push_callback_join(JoinKind::Left, table, Arc::new(build))
    }

    pub fn right_join_with<F>(self, table: &str, build: F) -> Self
    where
        F: Fn(JoinBuilder) -> JoinBuilder + Send + Sync + 'static,
    {
        self.push_callback_join(JoinKind::Right, table, Arc::new(build))
    }

    /// Add CROSS JOIN to the query
    pub fn cross_join(mut self, table: &str) -> Self {
        self.joins.push(Join::Cross {
            table: table.to_string(),
        });
        self
    }

    fn push_simple_join(
        mut self,
        kind: JoinKind,
        table: &str,
        column_a: &str,
        operator: &str,
        column_b: &str,
    ) -> Self {
        match operator.parse::<ConditionOperator>() {
            Ok(operator) => self.joins.push(Join::Simple {
                kind,
                table: table.to_string(),
                column_a: column_a.to_string(),
                operator,
                column_b: column_b.to_string(),
            }),
            Err(err) => self.fail(err),
        }
        self
    }

    fn push_callback_join(mut self, kind: JoinKind, table: &str, build: JoinCallback) -> Self {
        self.joins.push(Join::Callback {
            kind,
            table: table.to_string(),
            build,
        });
        self
    }
}
