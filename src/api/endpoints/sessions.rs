//! Therapy session routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::endpoints::db_scope;
use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::models::page::{Page, PageRequest};
use crate::models::TherapySession;
use crate::sessions::{self, CompletedSession, CompletionRequest, NewSessionRequest};
use crate::state::AppState;

/// `GET /api/sessions`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TherapySession>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = sessions::list_sessions(&conn, &scope, &page)?;
    Ok(Json(result))
}

/// `POST /api/sessions`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<NewSessionRequest>,
) -> Result<(StatusCode, Json<TherapySession>), ApiError> {
    let (mut conn, scope) = db_scope(&state, &user)?;
    let session = sessions::create_session(&mut conn, &scope, &body)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /api/sessions/:id/complete`
pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(session_id): Path<i64>,
    Json(body): Json<CompletionRequest>,
) -> Result<Json<CompletedSession>, ApiError> {
    let (mut conn, scope) = db_scope(&state, &user)?;
    let result = sessions::complete_session(&mut conn, &scope, session_id, &body)?;
    Ok(Json(result))
}
