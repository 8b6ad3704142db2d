//! Error types for the query builder and its execution gateway
//!
//! Precondition errors are raised from builder state before any SQL is sent.
//! Execution errors carry the driver's message unchanged.

use thiserror::Error;

/// Result type alias for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Error types for building and executing statements
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// INSERT/UPDATE/DELETE/SELECT issued before `table()` was called
    #[error("The table is not set.")]
    TableNotSet,

    /// UPDATE issued without any column assignments
    #[error("Nothing to update: no column values were given")]
    EmptyUpdate,

    /// Callback join whose callback added no ON condition
    #[error("Join on '{0}' has no ON condition")]
    EmptyJoinCondition(String),

    /// Raw condition with bindings but no SQL text
    #[error("Raw condition has bindings but no SQL")]
    EmptyCondition,

    /// Comparison operator outside the supported set
    #[error("Invalid operator: '{0}'")]
    InvalidOperator(String),

    /// Statement rejected by the database
    #[error("Query error: {0}")]
    Query(String),

    /// Pool or connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// A column value could not be converted
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DatabaseError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a precondition error raised before execution
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::TableNotSet
                | Self::EmptyUpdate
                | Self::EmptyJoinCondition(_)
                | Self::EmptyCondition
                | Self::InvalidOperator(_)
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(err.to_string())
            }
            sqlx::Error::Database(db_err) => DatabaseError::Query(db_err.message().to_string()),
            other => DatabaseError::Query(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::decode("<row>", err.to_string())
    }
}

/// Configuration loading errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Configuration parsing error: {message}")]
    ParseError { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_set_message() {
        assert_eq!(DatabaseError::TableNotSet.to_string(), "The table is not set.");
    }

    #[test]
    fn test_precondition_classification() {
        assert!(DatabaseError::TableNotSet.is_precondition());
        assert!(DatabaseError::EmptyUpdate.is_precondition());
        assert!(DatabaseError::InvalidOperator("~".into()).is_precondition());
        assert!(DatabaseError::EmptyJoinCondition("`d`".into()).is_precondition());
        assert!(DatabaseError::EmptyCondition.is_precondition());
        assert!(!DatabaseError::Query("Unknown column 'amount'".into()).is_precondition());
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: DatabaseError = ConfigError::MissingEnvVar {
            var: "DB_HOST".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DB_HOST"
        );
    }
}
