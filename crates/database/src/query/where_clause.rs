//! Query Builder WHERE clause operations
//!
//! `WhereClauses` is implemented by both [`QueryBuilder`] and
//! [`JoinBuilder`](super::joins::JoinBuilder). Each builder owns a
//! [`ConditionTree`] and every method appends one node to it.

use super::builder::QueryBuilder;
use super::conditions::ConditionTree;
use super::types::{BoundQuery, Logical};
use crate::error::DatabaseResult;
use crate::value::DatabaseValue;

/// Source of a sub-query embedded in a condition
#[derive(Debug, Clone)]
pub enum SubQuery {
    /// Pre-rendered SQL and bindings
    Bound(BoundQuery),
    /// A builder rendered as a SELECT when appended
    Builder(QueryBuilder),
}

impl SubQuery {
    pub fn render(self) -> DatabaseResult<BoundQuery> {
        match self {
            SubQuery::Bound(query) => Ok(query),
            SubQuery::Builder(builder) => builder.build_select(),
        }
    }
}

impl From<BoundQuery> for SubQuery {
    fn from(query: BoundQuery) -> Self {
        SubQuery::Bound(query)
    }
}

impl From<QueryBuilder> for SubQuery {
    fn from(builder: QueryBuilder) -> Self {
        SubQuery::Builder(builder)
    }
}

/// Entry point handed to sub-query callbacks
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEntry;

impl QueryEntry {
    pub fn new() -> Self {
        Self
    }

    /// Start a builder for the given table
    pub fn table(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new().table(table)
    }
}

/// Fluent WHERE-style operations over an owned condition tree
pub trait WhereClauses: Sized {
    /// Condition tree the operations append to
    fn conditions_mut(&mut self) -> &mut ConditionTree;

    /// Add a basic `column operator value` condition.
    ///
    /// A `NULL` value renders a null test instead of a binding.
    fn where_<V: Into<DatabaseValue>>(mut self, column: &str, operator: &str, value: V) -> Self {
        self.conditions_mut()
            .push_comparison(Logical::And, column, operator, value.into());
        self
    }

    fn or_where<V: Into<DatabaseValue>>(mut self, column: &str, operator: &str, value: V) -> Self {
        self.conditions_mut()
            .push_comparison(Logical::Or, column, operator, value.into());
        self
    }

    fn where_null(mut self, column: &str) -> Self {
        self.conditions_mut().push_null(Logical::And, column, false);
        self
    }

    fn or_where_null(mut self, column: &str) -> Self {
        self.conditions_mut().push_null(Logical::Or, column, false);
        self
    }

    fn where_not_null(mut self, column: &str) -> Self {
        self.conditions_mut().push_null(Logical::And, column, true);
        self
    }

    fn or_where_not_null(mut self, column: &str) -> Self {
        self.conditions_mut().push_null(Logical::Or, column, true);
        self
    }

    /// Add `column IN (?, ...)`; an empty list never matches
    fn where_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions_mut().push_in(Logical::And, column, values, false);
        self
    }

    fn or_where_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions_mut().push_in(Logical::Or, column, values, false);
        self
    }

    /// Add `column NOT IN (?, ...)`; an empty list always matches
    fn where_not_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions_mut().push_in(Logical::And, column, values, true);
        self
    }

    fn or_where_not_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions_mut().push_in(Logical::Or, column, values, true);
        self
    }

    fn where_between<A, B>(mut self, column: &str, from: A, to: B) -> Self
    where
        A: Into<DatabaseValue>,
        B: Into<DatabaseValue>,
    {
        self.conditions_mut()
            .push_between(Logical::And, column, from.into(), to.into(), false);
        self
    }

    fn or_where_between<A, B>(mut self, column: &str, from: A, to: B) -> Self
    where
        A: Into<DatabaseValue>,
        B: Into<DatabaseValue>,
    {
        self.conditions_mut()
            .push_between(Logical::Or, column, from.into(), to.into(), false);
        self
    }

    fn where_not_between<A, B>(mut self, column: &str, from: A, to: B) -> Self
    where
        A: Into<DatabaseValue>,
        B: Into<DatabaseValue>,
    {
        self.conditions_mut()
            .push_between(Logical::And, column, from.into(), to.into(), true);
        self
    }

    fn or_where_not_between<A, B>(mut self, column: &str, from: A, to: B) -> Self
    where
        A: Into<DatabaseValue>,
        B: Into<DatabaseValue>,
    {
        self.conditions_mut()
            .push_between(Logical::Or, column, from.into(), to.into(), true);
        self
    }

    fn where_like(self, column: &str, pattern: &str) -> Self {
        self.where_(column, "LIKE", pattern)
    }

    fn or_where_like(self, column: &str, pattern: &str) -> Self {
        self.or_where(column, "LIKE", pattern)
    }

    fn where_not_like(self, column: &str, pattern: &str) -> Self {
        self.where_(column, "NOT LIKE", pattern)
    }

    fn or_where_not_like(self, column: &str, pattern: &str) -> Self {
        self.or_where(column, "NOT LIKE", pattern)
    }

    /// Add a raw SQL condition, inserted verbatim
    fn where_raw(self, sql: &str) -> Self {
        self.where_raw_with(sql, Vec::<DatabaseValue>::new())
    }

    fn or_where_raw(self, sql: &str) -> Self {
        self.or_where_raw_with(sql, Vec::<DatabaseValue>::new())
    }

    /// Add a raw SQL condition with its own positional bindings
    fn where_raw_with<I, V>(mut self, sql: &str, bindings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let bindings = bindings.into_iter().map(Into::into).collect();
        self.conditions_mut().push_raw(Logical::And, sql, bindings);
        self
    }

    fn or_where_raw_with<I, V>(mut self, sql: &str, bindings: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let bindings = bindings.into_iter().map(Into::into).collect();
        self.conditions_mut().push_raw(Logical::Or, sql, bindings);
        self
    }

    /// Add a parenthesized sub-query condition such as an `EXISTS` body
    fn where_sub(mut self, query: impl Into<SubQuery>) -> Self {
        append_sub(self.conditions_mut(), Logical::And, None, query.into());
        self
    }

    fn or_where_sub(mut self, query: impl Into<SubQuery>) -> Self {
        append_sub(self.conditions_mut(), Logical::Or, None, query.into());
        self
    }

    /// Build the sub-query from a fresh [`QueryEntry`]
    fn where_sub_with<F>(self, build: F) -> Self
    where
        F: FnOnce(&QueryEntry) -> QueryBuilder,
    {
        self.where_sub(build(&QueryEntry))
    }

    fn or_where_sub_with<F>(self, build: F) -> Self
    where
        F: FnOnce(&QueryEntry) -> QueryBuilder,
    {
        self.or_where_sub(build(&QueryEntry))
    }

    /// Add `column IN (<sub-query>)`
    fn where_in_sub(mut self, column: &str, query: impl Into<SubQuery>) -> Self {
        append_sub(self.conditions_mut(), Logical::And, Some(column), query.into());
        self
    }

    fn or_where_in_sub(mut self, column: &str, query: impl Into<SubQuery>) -> Self {
        append_sub(self.conditions_mut(), Logical::Or, Some(column), query.into());
        self
    }

    fn where_in_sub_with<F>(self, column: &str, build: F) -> Self
    where
        F: FnOnce(&QueryEntry) -> QueryBuilder,
    {
        self.where_in_sub(column, build(&QueryEntry))
    }

    fn or_where_in_sub_with<F>(self, column: &str, build: F) -> Self
    where
        F: FnOnce(&QueryEntry) -> QueryBuilder,
    {
        self.or_where_in_sub(column, build(&QueryEntry))
    }
}

fn append_sub(tree: &mut ConditionTree, logical: Logical, column: Option<&str>, query: SubQuery) {
    match query.render() {
        Ok(query) => match column {
            Some(column) => tree.push_in_sub(logical, column, query),
            None => tree.push_sub(logical, query),
        },
        Err(err) => tree.fail(err),
    }
}

impl WhereClauses for QueryBuilder {
    fn conditions_mut(&mut self) -> &mut ConditionTree {
        &mut self.conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;

    fn where_sql(builder: &QueryBuilder) -> BoundQuery {
        builder.conditions.render().unwrap()
    }

    #[test]
    fn test_or_where_as_first_node_has_no_prefix() {
        let builder = QueryBuilder::new().table("users").or_where("id", "=", 1);
        assert_eq!(where_sql(&builder).sql, "`id` = ?");
    }

    #[test]
    fn test_where_null_value_matches_where_null() {
        let a = QueryBuilder::new().table("users").where_("deleted_at", "=", DatabaseValue::Null);
        let b = QueryBuilder::new().table("users").where_null("deleted_at");
        assert_eq!(where_sql(&a), where_sql(&b));
        assert!(where_sql(&a).bindings.is_empty());
    }

    #[test]
    fn test_between_and_like_variants() {
        let builder = QueryBuilder::new()
            .table("orders")
            .where_between("amount", 10, 20)
            .or_where_not_between("amount", 100, 200)
            .where_like("name", "A%")
            .or_where_not_like("name", "%z");

        let rendered = where_sql(&builder);
        assert_eq!(
            rendered.sql,
            "`amount` BETWEEN ? AND ? OR `amount` NOT BETWEEN ? AND ? AND `name` LIKE ? OR `name` NOT LIKE ?"
        );
        assert_eq!(rendered.bindings.len(), 6);
    }

    #[test]
    fn test_raw_conditions_keep_bindings_in_place() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_("a", "=", 1)
            .or_where_raw_with("`b` > ? AND `b` < ?", [2, 3])
            .where_raw("`c` IS NOT NULL");

        let rendered = where_sql(&builder);
        assert_eq!(rendered.sql, "`a` = ? OR `b` > ? AND `b` < ? AND `c` IS NOT NULL");
        assert_eq!(
            rendered.bindings,
            vec![DatabaseValue::Int(1), DatabaseValue::Int(2), DatabaseValue::Int(3)]
        );
    }

    #[test]
    fn test_where_sub_with_entry_point() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_("active", "=", true)
            .where_in_sub_with("id", |q| {
                q.table("orders").select(&["user_id"]).where_("amount", ">", 100)
            });

        let rendered = where_sql(&builder);
        assert_eq!(
            rendered.sql,
            "`active` = ? AND `id` IN (SELECT `user_id` FROM `orders` WHERE `amount` > ?)"
        );
        assert_eq!(
            rendered.bindings,
            vec![DatabaseValue::Bool(true), DatabaseValue::Int(100)]
        );
    }

    #[test]
    fn test_where_sub_copies_pre_rendered_pair() {
        let sub = BoundQuery::new(
            "EXISTS (SELECT 1 FROM `orders` WHERE `orders`.`user_id` = `users`.`id` AND `amount` > ?)",
            vec![DatabaseValue::Int(5)],
        );
        let builder = QueryBuilder::new().table("users").where_sub(sub);
        let rendered = where_sql(&builder);
        assert!(rendered.sql.starts_with("(EXISTS"));
        assert_eq!(rendered.bindings, vec![DatabaseValue::Int(5)]);
    }

    #[test]
    fn test_failed_sub_query_surfaces_on_render() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_sub(QueryBuilder::new().where_("id", "=", 1));
        assert!(matches!(
            builder.conditions.render(),
            Err(DatabaseError::TableNotSet)
        ));
    }

    #[test]
    fn test_null_and_not_null_variants() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_not_null("email")
            .or_where_null("phone")
            .or_where_not_null("users.verified_at")
            .where_null("deleted_at");

        let rendered = where_sql(&builder);
        assert_eq!(
            rendered.sql,
            "`email` IS NOT NULL OR `phone` IS NULL OR `users`.`verified_at` IS NOT NULL AND `deleted_at` IS NULL"
        );
        assert!(rendered.bindings.is_empty());
    }

    #[test]
    fn test_where_not_in_variants() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_not_in("id", [1, 2])
            .or_where_not_in("role", ["guest"])
            .where_in("status", ["active", "pending"]);

        let rendered = where_sql(&builder);
        assert_eq!(
            rendered.sql,
            "`id` NOT IN (?, ?) OR `role` NOT IN (?) AND `status` IN (?, ?)"
        );
        assert_eq!(
            rendered.bindings,
            vec![
                DatabaseValue::Int(1),
                DatabaseValue::Int(2),
                DatabaseValue::from("guest"),
                DatabaseValue::from("active"),
                DatabaseValue::from("pending"),
            ]
        );
        assert_eq!(rendered.placeholder_count(), rendered.bindings.len());
    }

    #[test]
    fn test_or_where_in_sub_and_where_sub_with() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_("active", "=", true)
            .or_where_in_sub(
                "id",
                QueryBuilder::new()
                    .table("admins")
                    .select(&["user_id"])
                    .where_("level", ">=", 3),
            )
            .where_sub_with(|q| q.table("settings").select_raw("1").where_("beta", "=", 1));

        let rendered = where_sql(&builder);
        assert_eq!(
            rendered.sql,
            "`active` = ? OR `id` IN (SELECT `user_id` FROM `admins` WHERE `level` >= ?) \
             AND (SELECT 1 FROM `settings` WHERE `beta` = ?)"
        );
        assert_eq!(
            rendered.bindings,
            vec![DatabaseValue::Bool(true), DatabaseValue::Int(3), DatabaseValue::Int(1)]
        );
        assert_eq!(rendered.placeholder_count(), rendered.bindings.len());
    }

    #[test]
    fn test_blank_raw_condition_adds_nothing() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_("id", "=", 1)
            .or_where_raw("")
            .where_raw("  ");

        let query = builder.build_select().unwrap();
        assert_eq!(query.sql, "SELECT * FROM `users` WHERE `id` = ?");
    }

    #[test]
    fn test_blank_raw_condition_with_bindings_fails_render() {
        let builder = QueryBuilder::new()
            .table("users")
            .where_("id", "=", 1)
            .or_where_raw_with("", [2]);
        assert!(matches!(builder.build_select(), Err(DatabaseError::EmptyCondition)));
    }
}
