//! API error rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use bankly_auth::AuthError;
use bankly_model::ModelError;
use bankly_storage::StorageError;

/// An error rendered to the client as `{"status": <code>, "message": <text>}`.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Creates an error with the given status and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": self.status.as_u16(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match &err {
            ModelError::Conflict(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            ModelError::Unauthorized => Self::unauthorized(err.to_string()),
            ModelError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            ModelError::Storage(StorageError::InvalidArgument) => {
                Self::bad_request(err.to_string())
            },
            ModelError::Storage(_) | ModelError::Hash(_) => {
                error!(error = %err, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        // Every auth failure surfaces as 401
        Self::unauthorized(err.to_string())
    }
}
