//! User model error types.

use thiserror::Error;

use bankly_storage::StorageError;

/// Errors that can occur in the user model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A user with the requested username already exists.
    #[error("There already exists a user with username '{0}'")]
    Conflict(String),

    /// Credentials could not be verified.
    #[error("Cannot authenticate")]
    Unauthorized,

    /// No user matches the requested username.
    #[error("No such user")]
    NotFound,

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("hashing error: {0}")]
    Hash(String),
}
