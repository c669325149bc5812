//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::error::HttpError;
use crate::web::state::{AppState, AuthContext};

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Middleware that validates the bearer token and resolves the caller.
///
/// If valid, inserts an `AuthContext` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string)
        .ok_or_else(|| HttpError::unauthorized("Unauthorized User"))?;

    let user_id = state
        .db
        .validate_auth_session(&token)
        .await
        .map_err(|e| {
            debug!("Rejected bearer token: {:?}", e);
            HttpError::unauthorized("Unauthorized User")
        })?;

    req.extensions_mut().insert(AuthContext { user_id, token });

    Ok(next.run(req).await)
}
