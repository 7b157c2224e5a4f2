/// Error types for the feed service
///
/// Errors are split into a transient infrastructure class (retried on the
/// write path, fail-open on the read path) and a permanent class that is
/// surfaced to the caller immediately.
use thiserror::Error;

/// Result type for feed-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(String),

    /// Cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Message channel operation failed
    #[error("queue error: {0}")]
    Queue(String),

    /// Operation exceeded its time budget
    #[error("timeout: {0}")]
    Timeout(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Malformed input (cursor, queued payload)
    #[error("validation error: {0}")]
    Validation(String),

    /// Write path gave up after exhausting its retry budget.
    /// Durable and cache state may have partially committed; reads
    /// self-heal through the database fallback.
    #[error("write failed after {attempts} attempts: {last_error}")]
    WriteFailure { attempts: u32, last_error: String },

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the write path should retry this error.
    ///
    /// Timeouts, connectivity faults and transient storage errors qualify;
    /// validation and serialization failures never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Database(_) | AppError::Cache(_) | AppError::Queue(_) | AppError::Timeout(_)
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => AppError::Timeout("database pool timed out".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Cache(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
