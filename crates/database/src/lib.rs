//! # kc-database: fluent MySQL query builder
//!
//! Statements are assembled through chained calls on a [`QueryBuilder`] and
//! rendered into SQL text with `?` placeholders plus an ordered list of
//! [`DatabaseValue`] bindings. Terminal operations hand that pair to a
//! [`QueryExecutor`]; [`MySqlExecutor`] runs it on a sqlx MySQL pool.
//!
//! ```
//! use kc_database::{QueryBuilder, WhereClauses};
//!
//! let query = QueryBuilder::new()
//!     .table("users AS u")
//!     .inner_join_with("deposits AS d", |join| {
//!         join.on("u.id", "=", "d.user_id").where_("d.amount", ">", 4000)
//!     })
//!     .where_("u.active", "=", true)
//!     .build_select()
//!     .unwrap();
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT * FROM `users` AS `u` INNER JOIN `deposits` AS `d` \
//!      ON (`u`.`id` = `d`.`user_id` AND `d`.`amount` > ?) WHERE `u`.`active` = ?"
//! );
//! assert_eq!(query.bindings.len(), 2);
//! ```

pub mod backends;
pub mod config;
pub mod database;
pub mod error;
pub mod escape;
pub mod query;
pub mod value;


// Re-export core traits and types
pub use backends::{DatabaseRow, ExecuteResult, MySqlExecutor, QueryExecutor};
pub use config::{DatabaseConfig, PoolConfig};
pub use database::Database;
pub use error::{ConfigError, DatabaseError, DatabaseResult};
pub use query::*;
pub use value::DatabaseValue;
