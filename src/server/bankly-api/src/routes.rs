//! Route handlers for the auth and users endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use bankly_auth::{Claims, IdentityContext};
use bankly_model::NewUser;
use bankly_storage::SqlValue;

use crate::error::ApiError;
use crate::AppState;

/// Columns a PATCH request may change.
const UPDATABLE_COLUMNS: [&str; 4] = ["first_name", "last_name", "email", "phone"];

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// `POST /auth/register` - registers a new user and issues a token.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.register(input).await?;
    let token = state
        .tokens
        .encode(&Claims::new(user.username.as_str(), user.admin))?;

    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// `POST /auth/login` - authenticates a user and issues a token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .authenticate(&body.username, &body.password)
        .await?;
    let token = state
        .tokens
        .encode(&Claims::new(user.username.as_str(), user.admin))?;

    Ok(Json(json!({ "token": token })))
}

/// Optional filters for `GET /users`; accepted but not applied.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Lower payment bound.
    pub min_payments: Option<i64>,
    /// Upper payment bound.
    pub max_payments: Option<i64>,
}

/// `GET /users` - lists all users.
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .users
        .get_all(params.min_payments, params.max_payments)
        .await?;

    Ok(Json(json!({ "users": users })))
}

/// `GET /users/{username}` - fetches one user.
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.get(&username).await?;

    Ok(Json(json!({ "user": user })))
}

/// `PATCH /users/{username}` - partially updates a user.
///
/// The caller must be the user themselves or an admin. Only descriptive
/// columns are updatable; control fields (leading `_`) are ignored.
pub async fn patch_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(username): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    if !ctx.is_admin() && ctx.username() != Some(username.as_str()) {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Expected a JSON object"))?;

    for key in obj.keys() {
        if !key.starts_with('_') && !UPDATABLE_COLUMNS.contains(&key.as_str()) {
            return Err(ApiError::bad_request(format!(
                "Field '{key}' is not updatable"
            )));
        }
    }

    let mut fields = Vec::new();
    for column in UPDATABLE_COLUMNS {
        if let Some(value) = obj.get(column) {
            let text = value.as_str().ok_or_else(|| {
                ApiError::bad_request(format!("Field '{column}' must be a string"))
            })?;
            fields.push((column.to_string(), SqlValue::from(text)));
        }
    }

    if fields.is_empty() {
        return Err(ApiError::bad_request("No updatable fields provided"));
    }

    let user = state.users.update(&username, &fields).await?;

    Ok(Json(json!({ "user": user })))
}

/// `DELETE /users/{username}` - removes a user.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete(&username).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}
