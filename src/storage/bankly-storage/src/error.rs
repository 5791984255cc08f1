//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A required statement-builder input was missing or empty.
    #[error("All parameters must be provided.")]
    InvalidArgument,

    /// Connection error.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution error.
    #[error("query failed: {0}")]
    QueryFailed(String),
}
