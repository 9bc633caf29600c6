//! Error types for tablekit

use thiserror::Error;

/// Result type alias for tablekit operations
pub type TableResult<T> = Result<T, TableError>;

/// Error types for building and executing table operations
#[derive(Debug, Error)]
pub enum TableError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// The builder was given input it cannot turn into SQL
    #[error("Build error: {0}")]
    Build(String),

    /// Statement execution error reported by the driver
    #[error("Execution error: {0}")]
    Execution(#[from] tokio_postgres::Error),

    /// A returned cell could not be rendered as text
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl TableError {
    /// Create a build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a build error
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// SQLSTATE code of the underlying database error, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for TableError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
