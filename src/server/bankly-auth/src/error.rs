//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A token was present but decoded to no payload.
    #[error("Failed to decode token")]
    FailedDecode,

    /// Caller lacks the rights for the gated resource.
    #[error("Unauthorized")]
    Unauthorized,

    /// The token library raised while decoding or encoding.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}
