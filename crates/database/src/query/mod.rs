//! Query Builder Module - fluent MySQL statement builder

pub mod builder;
pub mod conditions;
pub mod dml;
pub mod execution;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod select;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

pub use builder::QueryBuilder;
pub use conditions::{ConditionNode, ConditionTree, HavingClause};
pub use dml::Record;
pub use joins::{Join, JoinBuilder, JoinCallback};
pub use types::{BoundQuery, ConditionOperator, JoinKind, Limit, Logical, OrderBy, OrderClause, OrderDirection};
pub use where_clause::{QueryEntry, SubQuery, WhereClauses};
