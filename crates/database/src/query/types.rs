//! Query Builder Types - Core types and enums for query building

use std::fmt;
use std::str::FromStr;

use crate::error::DatabaseError;
use crate::value::DatabaseValue;

/// Comparison operators accepted by structured conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    Equal,
    NullSafeEqual,
    NotEqual,
    LessGreater,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    NotLike,
}

impl FromStr for ConditionOperator {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "=" => Ok(ConditionOperator::Equal),
            "<=>" => Ok(ConditionOperator::NullSafeEqual),
            "!=" => Ok(ConditionOperator::NotEqual),
            "<>" => Ok(ConditionOperator::LessGreater),
            ">" => Ok(ConditionOperator::GreaterThan),
            ">=" => Ok(ConditionOperator::GreaterThanOrEqual),
            "<" => Ok(ConditionOperator::LessThan),
            "<=" => Ok(ConditionOperator::LessThanOrEqual),
            "LIKE" => Ok(ConditionOperator::Like),
            "NOT LIKE" => Ok(ConditionOperator::NotLike),
            _ => Err(DatabaseError::InvalidOperator(s.to_string())),
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOperator::Equal => write!(f, "="),
            ConditionOperator::NullSafeEqual => write!(f, "<=>"),
            ConditionOperator::NotEqual => write!(f, "!="),
            ConditionOperator::LessGreater => write!(f, "<>"),
            ConditionOperator::GreaterThan => write!(f, ">"),
            ConditionOperator::GreaterThanOrEqual => write!(f, ">="),
            ConditionOperator::LessThan => write!(f, "<"),
            ConditionOperator::LessThanOrEqual => write!(f, "<="),
            ConditionOperator::Like => write!(f, "LIKE"),
            ConditionOperator::NotLike => write!(f, "NOT LIKE"),
        }
    }
}

/// Logical connective between condition nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logical {
    #[default]
    And,
    Or,
}

impl fmt::Display for Logical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logical::And => write!(f, "AND"),
            Logical::Or => write!(f, "OR"),
        }
    }
}

/// Join types that carry an ON condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
        }
    }
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// A single ORDER BY entry, column already escaped
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

/// ORDER BY entries keep insertion order across escaped and raw forms
#[derive(Debug, Clone, PartialEq)]
pub enum OrderClause {
    Column(OrderBy),
    Raw(String),
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderClause::Column(order) => write!(f, "{} {}", order.column, order.direction),
            OrderClause::Raw(sql) => write!(f, "{}", sql),
        }
    }
}

/// LIMIT/OFFSET pair, always rendered as two placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub count: u64,
    pub offset: u64,
}

/// Rendered SQL text and its positional bindings
///
/// The Nth `?` in `sql` corresponds to the Nth entry of `bindings`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundQuery {
    pub sql: String,
    pub bindings: Vec<DatabaseValue>,
}

impl BoundQuery {
    pub fn new(sql: impl Into<String>, bindings: Vec<DatabaseValue>) -> Self {
        Self {
            sql: sql.into(),
            bindings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Count placeholders outside quoted text
    pub fn placeholder_count(&self) -> usize {
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut count = 0;

        for ch in self.sql.chars() {
            match quote {
                Some(q) => {
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' && q != '`' {
                        escaped = true;
                    } else if ch == q {
                        quote = None;
                    }
                }
                None => match ch {
                    '\'' | '"' | '`' => quote = Some(ch),
                    '?' => count += 1,
                    _ => {}
                },
            }
        }

        count
    }
}
