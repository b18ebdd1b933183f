//! Storage gateway error types.

use kudos_core::Error;

/// Result alias for gateway operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage gateway error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error (connection, query, transaction).
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violated for the named field.
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// Connection URL scheme is not postgres/mysql/sqlite.
    #[error("unsupported database URL scheme")]
    UnsupportedUrl,

    /// Backend-specific failure (corrupt row, bad enum value).
    #[error("backend: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate("email") => Error::EmailTaken,
            other => Error::Storage(other.to_string()),
        }
    }
}
