//! Notification inbox routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::endpoints::db_scope;
use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::models::Notification;
use crate::notifications;
use crate::state::AppState;

/// `GET /api/notifications/unread`
pub async fn unread(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = notifications::list_unread(&conn, &scope)?;
    Ok(Json(result))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    notifications::mark_read(&conn, &scope, id)?;
    Ok(StatusCode::NO_CONTENT)
}
