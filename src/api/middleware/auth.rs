//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it against the
//! session store, and injects `AuthedUser` into request extensions for
//! downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::error::ServiceError;
use crate::state::AppState;

pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let state: AppState = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| ApiError::Internal("missing app state".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ServiceError::InvalidSession)
        .map_err(ApiError::from)?
        .to_string();

    let claims = {
        let sessions = state
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.validate(&token)?
    };

    req.extensions_mut().insert(AuthedUser(claims));
    Ok(next.run(req).await)
}
