//! Execution gateway: the trait the builder talks to and its MySQL implementation

pub mod core;
pub mod mysql;

// Re-export core traits and types
pub use self::core::{DatabaseRow, ExecuteResult, QueryExecutor};
pub use self::mysql::MySqlExecutor;
