//! Query Builder SQL generation
//!
//! SELECT clauses render in a fixed order: projection, table, joins, WHERE,
//! GROUP BY, HAVING, ORDER BY, LIMIT. Bindings are appended in the same order
//! the placeholders appear in the text.

use super::builder::QueryBuilder;
use super::conditions::render_havings;
use super::types::BoundQuery;
use crate::error::{DatabaseError, DatabaseResult};
use crate::escape::{escape_column, interpolate};
use crate::value::DatabaseValue;

/// Column alias read back by aggregate queries
pub(crate) const AGGREGATE_ALIAS: &str = "aggregate";

impl QueryBuilder {
    /// Render the SELECT statement with `?` placeholders
    pub fn build_select(&self) -> DatabaseResult<BoundQuery> {
        let table = self.checked_table()?;

        let mut parts: Vec<String> = Vec::new();
        let mut bindings: Vec<DatabaseValue> = Vec::new();

        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        if self.distinct {
            parts.push(format!("SELECT DISTINCT {}", projection));
        } else {
            parts.push(format!("SELECT {}", projection));
        }
        parts.push(format!("FROM {}", table));

        for join in &self.joins {
            let join = join.render()?;
            parts.push(join.sql);
            bindings.extend(join.bindings);
        }

        let conditions = self.build_where()?;
        if !conditions.is_empty() {
            parts.push(conditions.sql);
            bindings.extend(conditions.bindings);
        }

        if !self.groups.is_empty() {
            parts.push(format!("GROUP BY {}", self.groups.join(", ")));
        }

        if !self.havings.is_empty() {
            let havings = render_havings(&self.havings);
            parts.push(format!("HAVING {}", havings.sql));
            bindings.extend(havings.bindings);
        }

        if !self.orders.is_empty() {
            let orders: Vec<String> = self.orders.iter().map(ToString::to_string).collect();
            parts.push(format!("ORDER BY {}", orders.join(", ")));
        }

        if let Some(limit) = self.current_limit() {
            parts.push("LIMIT ? OFFSET ?".to_string());
            bindings.push(DatabaseValue::UInt(limit.count));
            bindings.push(DatabaseValue::UInt(limit.offset));
        }

        Ok(BoundQuery::new(parts.join(" "), bindings))
    }

    /// Render `SELECT FUNC(column|*) AS aggregate ...` limited to one row
    pub fn build_aggregate(&self, function: &str, column: Option<&str>) -> DatabaseResult<BoundQuery> {
        let argument = column.map(escape_column).unwrap_or_else(|| "*".to_string());
        let mut query = self.clone();
        query.columns = vec![format!(
            "{}({}) AS {}",
            function.to_uppercase(),
            argument,
            AGGREGATE_ALIAS
        )];
        query.limit(1).build_select()
    }

    /// Render the SELECT statement with bindings inlined as literals.
    ///
    /// For logging and inspection only; never execute the result.
    pub fn to_sql(&self) -> DatabaseResult<String> {
        let query = self.build_select()?;
        Ok(interpolate(&query.sql, &query.bindings))
    }

    /// WHERE clause including the keyword, or an empty query
    pub(crate) fn build_where(&self) -> DatabaseResult<BoundQuery> {
        let conditions = self.conditions.render()?;
        if conditions.is_empty() {
            return Ok(conditions);
        }
        Ok(BoundQuery::new(
            format!("WHERE {}", conditions.sql),
            conditions.bindings,
        ))
    }

    /// Base table, after surfacing any error recorded by chained calls
    pub(crate) fn checked_table(&self) -> DatabaseResult<&str> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.table.as_deref().ok_or(DatabaseError::TableNotSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::types::OrderDirection;
    use crate::query::where_clause::WhereClauses;

    #[test]
    fn test_select_with_where_and_columns() {
        let query = QueryBuilder::new()
            .table("users")
            .where_("id", "=", 1)
            .select(&["id", "name"])
            .build_select()
            .unwrap();
        assert_eq!(query.sql, "SELECT `id`, `name` FROM `users` WHERE `id` = ?");
        assert_eq!(query.bindings, vec![DatabaseValue::Int(1)]);
    }

    #[test]
    fn test_clause_order_is_fixed() {
        let query = QueryBuilder::new()
            .order_by("total", OrderDirection::Desc)
            .limit_offset(10, 20)
            .having("total", ">", 5)
            .group_by("r.id")
            .where_("u.active", "=", true)
            .inner_join("roles AS r", "u.role_id", "=", "r.id")
            .distinct()
            .table("users AS u")
            .build_select()
            .unwrap();

        assert_eq!(
            query.sql,
            "SELECT DISTINCT * FROM `users` AS `u` \
             INNER JOIN `roles` AS `r` ON `u`.`role_id` = `r`.`id` \
             WHERE `u`.`active` = ? GROUP BY `r`.`id` HAVING `total` > ? \
             ORDER BY `total` DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(
            query.bindings,
            vec![
                DatabaseValue::Bool(true),
                DatabaseValue::Int(5),
                DatabaseValue::UInt(10),
                DatabaseValue::UInt(20),
            ]
        );
    }

    #[test]
    fn test_limit_is_always_bound() {
        let query = QueryBuilder::new()
            .table("x")
            .limit_offset(2, 5)
            .build_select()
            .unwrap();
        assert_eq!(query.sql, "SELECT * FROM `x` LIMIT ? OFFSET ?");
        assert_eq!(query.bindings, vec![DatabaseValue::UInt(2), DatabaseValue::UInt(5)]);
    }

    #[test]
    fn test_join_bindings_precede_where_bindings() {
        let query = QueryBuilder::new()
            .table("users AS u")
            .inner_join_with("deposits AS d", |b| {
                b.on("u.id", "=", "d.user_id").where_("d.amount", ">", 100)
            })
            .where_("u.id", "=", 7)
            .build_select()
            .unwrap();
        assert_eq!(
            query.bindings,
            vec![DatabaseValue::Int(100), DatabaseValue::Int(7)]
        );
        assert_eq!(query.placeholder_count(), query.bindings.len());
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let builder = QueryBuilder::new()
            .table("users")
            .left_join_with("d", |b| b.on("users.id", "=", "d.user_id").where_in("d.kind", [1, 2]))
            .where_("a", "=", 1)
            .or_where_between("b", 1, 9)
            .limit(3);
        assert_eq!(builder.build_select().unwrap(), builder.build_select().unwrap());
    }

    #[test]
    fn test_select_requires_table() {
        let err = QueryBuilder::new().where_("id", "=", 1).build_select().unwrap_err();
        assert!(matches!(err, DatabaseError::TableNotSet));
    }

    #[test]
    fn test_invalid_operator_surfaces_from_render() {
        let err = QueryBuilder::new()
            .table("users")
            .where_("id", "==", 1)
            .build_select()
            .unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidOperator(op) if op == "=="));
    }

    #[test]
    fn test_aggregate_replaces_projection_and_limits() {
        let builder = QueryBuilder::new()
            .table("users AS u")
            .inner_join("roles AS r", "u.role_id", "=", "r.id")
            .group_by("r.id")
            .select(&["u.id"]);
        let query = builder.build_aggregate("count", None).unwrap();
        assert_eq!(
            query.sql,
            "SELECT COUNT(*) AS aggregate FROM `users` AS `u` \
             INNER JOIN `roles` AS `r` ON `u`.`role_id` = `r`.`id` \
             GROUP BY `r`.`id` LIMIT ? OFFSET ?"
        );
        assert_eq!(builder.columns, vec!["`u`.`id`"]);

        let query = builder.build_aggregate("sum", Some("u.balance")).unwrap();
        assert!(query.sql.starts_with("SELECT SUM(`u`.`balance`) AS aggregate"));
    }

    #[test]
    fn test_to_sql_inlines_literals() {
        let sql = QueryBuilder::new()
            .table("users")
            .where_("name", "=", "O'Brien")
            .limit(1)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `users` WHERE `name` = 'O\\'Brien' LIMIT 1 OFFSET 0"
        );
    }
}
