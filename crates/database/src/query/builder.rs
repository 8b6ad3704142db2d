//! Query Builder - Core builder implementation

use super::conditions::{ConditionTree, HavingClause};
use super::joins::Join;
use super::types::OrderClause;
use crate::error::DatabaseError;

/// Query builder for constructing MySQL statements
///
/// Chained calls only accumulate state. Terminal operations render from that
/// state and leave it untouched, so one builder can be executed repeatedly.
/// A builder is not synchronized; share clones rather than one instance.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) table: Option<String>,
    pub(crate) distinct: bool,
    pub(crate) columns: Vec<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) conditions: ConditionTree,
    pub(crate) groups: Vec<String>,
    pub(crate) havings: Vec<HavingClause>,
    pub(crate) orders: Vec<OrderClause>,
    pub(crate) limit_count: Option<u64>,
    pub(crate) offset_value: u64,
    pub(crate) error: Option<DatabaseError>,
}

impl QueryBuilder {
    /// Create a new query builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error raised by a chained call; the first one is kept
    pub(crate) fn fail(&mut self, error: DatabaseError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
