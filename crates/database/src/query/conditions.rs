//! Condition tree shared by WHERE clauses and callback join conditions

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{BoundQuery, ConditionOperator, Logical};
use crate::error::{DatabaseError, DatabaseResult};
use crate::escape::escape_column;
use crate::value::DatabaseValue;

static LEADING_LOGICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:AND|OR)(?:\s+|$)").expect("leading logical pattern is valid")
});

/// One predicate of a condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Structured {
        column: String,
        operator: ConditionOperator,
        value: DatabaseValue,
        logical: Logical,
    },
    /// Fragment already carries its `AND `/`OR ` prefix
    Raw {
        fragment: String,
        bindings: Vec<DatabaseValue>,
    },
}

impl ConditionNode {
    fn render(&self, first: bool, sql: &mut Vec<String>, bindings: &mut Vec<DatabaseValue>) {
        match self {
            ConditionNode::Structured {
                column,
                operator,
                value,
                logical,
            } => {
                let predicate = format!("{} {} ?", escape_column(column), operator);
                if first {
                    sql.push(predicate);
                } else {
                    sql.push(format!("{} {}", logical, predicate));
                }
                bindings.push(value.clone());
            }
            ConditionNode::Raw {
                fragment,
                bindings: values,
            } => {
                let fragment = fragment.trim();
                let fragment = if first {
                    LEADING_LOGICAL.replace(fragment, "").into_owned()
                } else {
                    fragment.to_string()
                };
                if !fragment.is_empty() {
                    sql.push(fragment);
                }
                bindings.extend(values.iter().cloned());
            }
        }
    }
}

/// Ordered list of condition nodes
///
/// Nodes are rendered strictly left to right with no parenthesization between
/// them. The first node never carries a logical prefix.
#[derive(Debug, Clone, Default)]
pub struct ConditionTree {
    nodes: Vec<ConditionNode>,
    error: Option<DatabaseError>,
}

impl ConditionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[ConditionNode] {
        &self.nodes
    }

    /// First error recorded while appending, if any
    pub fn error(&self) -> Option<&DatabaseError> {
        self.error.as_ref()
    }

    /// Record an append-time failure; the first one wins
    pub fn fail(&mut self, error: DatabaseError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Append `column operator ?`; a `NULL` value becomes `column IS NULL`
    /// whatever the operator
    pub fn push_comparison(
        &mut self,
        logical: Logical,
        column: &str,
        operator: &str,
        value: DatabaseValue,
    ) {
        let operator = match operator.parse::<ConditionOperator>() {
            Ok(operator) => operator,
            Err(err) => return self.fail(err),
        };

        if value.is_null() {
            return self.push_null(logical, column, false);
        }

        self.nodes.push(ConditionNode::Structured {
            column: column.to_string(),
            operator,
            value,
            logical,
        });
    }

    /// Append a raw fragment; a blank fragment without bindings is skipped
    pub fn push_raw(&mut self, logical: Logical, sql: &str, bindings: Vec<DatabaseValue>) {
        let sql = sql.trim();
        if sql.is_empty() {
            if !bindings.is_empty() {
                self.fail(DatabaseError::EmptyCondition);
            }
            return;
        }

        self.nodes.push(ConditionNode::Raw {
            fragment: format!("{} {}", logical, sql),
            bindings,
        });
    }

    pub fn push_null(&mut self, logical: Logical, column: &str, negated: bool) {
        let test = if negated { "IS NOT NULL" } else { "IS NULL" };
        self.push_raw(logical, &format!("{} {}", escape_column(column), test), Vec::new());
    }

    /// Append an IN list; an empty list renders a constant predicate
    pub fn push_in(&mut self, logical: Logical, column: &str, values: Vec<DatabaseValue>, negated: bool) {
        if values.is_empty() {
            let constant = if negated { "1 = 1" } else { "0 = 1" };
            return self.push_raw(logical, constant, Vec::new());
        }

        let placeholders = vec!["?"; values.len()].join(", ");
        let keyword = if negated { "NOT IN" } else { "IN" };
        let sql = format!("{} {} ({})", escape_column(column), keyword, placeholders);
        self.push_raw(logical, &sql, values);
    }

    pub fn push_between(
        &mut self,
        logical: Logical,
        column: &str,
        from: DatabaseValue,
        to: DatabaseValue,
        negated: bool,
    ) {
        let keyword = if negated { "NOT BETWEEN" } else { "BETWEEN" };
        let sql = format!("{} {} ? AND ?", escape_column(column), keyword);
        self.push_raw(logical, &sql, vec![from, to]);
    }

    /// Append a parenthesized sub-query, copying its SQL and bindings
    pub fn push_sub(&mut self, logical: Logical, query: BoundQuery) {
        self.push_raw(logical, &format!("({})", query.sql), query.bindings);
    }

    pub fn push_in_sub(&mut self, logical: Logical, column: &str, query: BoundQuery) {
        let sql = format!("{} IN ({})", escape_column(column), query.sql);
        self.push_raw(logical, &sql, query.bindings);
    }

    /// Render the predicates without a leading keyword
    pub fn render(&self) -> DatabaseResult<BoundQuery> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        let mut sql = Vec::with_capacity(self.nodes.len());
        let mut bindings = Vec::new();

        for (index, node) in self.nodes.iter().enumerate() {
            node.render(index == 0, &mut sql, &mut bindings);
        }

        Ok(BoundQuery::new(sql.join(" "), bindings))
    }
}

/// HAVING entry; entries after the first are joined with AND
#[derive(Debug, Clone, PartialEq)]
pub enum HavingClause {
    Structured {
        column: String,
        operator: ConditionOperator,
        value: DatabaseValue,
    },
    Raw {
        sql: String,
        bindings: Vec<DatabaseValue>,
    },
}

pub(crate) fn render_havings(havings: &[HavingClause]) -> BoundQuery {
    let mut parts = Vec::with_capacity(havings.len());
    let mut bindings = Vec::new();

    for having in havings {
        match having {
            HavingClause::Structured {
                column,
                operator,
                value,
            } => {
                parts.push(format!("{} {} ?", escape_column(column), operator));
                bindings.push(value.clone());
            }
            HavingClause::Raw { sql, bindings: values } => {
                parts.push(sql.trim().to_string());
                bindings.extend(values.iter().cloned());
            }
        }
    }

    BoundQuery::new(parts.join(" AND "), bindings)
}
