//! Request middleware: identity propagation and access control gates.
//!
//! The identity stage runs on every request; the gate stages are attached
//! per route. Gates evaluate to a [`GateOutcome`]: `require_login` denies by
//! writing the 401 response itself, `require_admin` forwards a structured
//! error to the failure channel. The asymmetry comes from the gate layer and
//! is preserved here.

use std::collections::HashMap;

use axum::body::{to_bytes, Body};
use axum::extract::{Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

use bankly_auth::{gate, GateOutcome, IdentityContext};

use crate::error::ApiError;
use crate::AppState;

/// Upper bound on buffered request bodies when looking for `_token`.
const BODY_LIMIT: usize = 64 * 1024;

/// Identity propagation: reads a `_token` from the query string or a JSON
/// body and attaches the resolved [`IdentityContext`] to request extensions.
///
/// A missing token is not an error; the request proceeds anonymously.
pub async fn identify(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (token, mut req) = extract_token(req).await?;

    let ctx = gate::resolve_identity(state.tokens.as_ref(), token.as_deref())?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Gate middleware: the caller must be logged in.
pub async fn require_login(req: Request, next: Next) -> Response {
    let ctx = current_identity(&req);

    match gate::require_login(&ctx) {
        GateOutcome::Proceed => next.run(req).await,
        outcome => reject(outcome),
    }
}

/// Gate middleware: the caller must be an admin.
pub async fn require_admin(req: Request, next: Next) -> Response {
    let ctx = current_identity(&req);

    match gate::require_admin(&ctx) {
        GateOutcome::Proceed => next.run(req).await,
        outcome => reject(outcome),
    }
}

/// The identity attached by [`identify`], or anonymous if the identity
/// stage did not run.
fn current_identity(req: &Request) -> IdentityContext {
    req.extensions()
        .get::<IdentityContext>()
        .cloned()
        .unwrap_or_default()
}

/// Renders a non-proceed gate outcome.
fn reject(outcome: GateOutcome) -> Response {
    match outcome {
        GateOutcome::Proceed => unreachable!("proceed is handled by the caller"),
        GateOutcome::Deny { status, body } => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(body)).into_response()
        },
        GateOutcome::Forward(err) => ApiError::from(err).into_response(),
    }
}

/// Pulls `_token` out of the query string or a JSON body.
///
/// The body is buffered and put back so downstream extractors still see it.
async fn extract_token(req: Request) -> Result<(Option<String>, Request), ApiError> {
    if let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(req.uri()) {
        if let Some(token) = params.get("_token") {
            return Ok((Some(token.clone()), req));
        }
    }

    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !is_json {
        return Ok((None, req));
    }

    let (parts, body) = req.into_parts();
    let bytes = to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| ApiError::bad_request("Request body too large"))?;

    let token = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|v| v.get("_token").and_then(|t| t.as_str().map(String::from)));

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}
