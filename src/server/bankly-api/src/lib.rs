//! # Bankly API
//!
//! REST API layer for Bankly.
//!
//! ## Endpoints
//!
//! - `POST /auth/register`, `POST /auth/login` - credential endpoints
//! - `GET /users`, `GET|PATCH|DELETE /users/{username}` - user management
//! - `GET /health` - liveness
//!
//! Every request passes the identity stage; the user routes sit behind the
//! login gate and deletion behind the admin gate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, post};
use axum::Router;

use bankly_auth::TokenCodec;
use bankly_model::UserStore;

pub use error::ApiError;

/// Shared application state handed to handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    /// The user model.
    pub users: UserStore,
    /// Token encode/decode capability.
    pub tokens: Arc<dyn TokenCodec>,
}

/// Builds the application router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/register", post(routes::register))
        .route("/auth/login", post(routes::login))
        .route(
            "/users",
            get(routes::list_users).route_layer(from_fn(middleware::require_login)),
        )
        .route(
            "/users/{username}",
            get(routes::get_user)
                .patch(routes::patch_user)
                .route_layer(from_fn(middleware::require_login)),
        )
        .route(
            "/users/{username}",
            delete(routes::delete_user).route_layer(from_fn(middleware::require_admin)),
        )
        .layer(from_fn_with_state(state.clone(), middleware::identify))
        .with_state(state)
}
