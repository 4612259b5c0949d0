//! Admin user directory.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::endpoints::db_scope;
use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::page::{Page, PageRequest};
use crate::models::{TherapistRecord, User};
use crate::roster;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: String,
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
}

/// `GET /api/users?role=&page=&pageSize=`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    let role: Role = query
        .role
        .parse()
        .map_err(|_| ServiceError::Validation(format!("unknown role: {}", query.role)))?;
    let (conn, scope) = db_scope(&state, &user)?;
    let page = PageRequest {
        page: query.page,
        page_size: query.page_size,
    };
    let result = roster::list_users(&conn, &scope, role, &page)?;
    Ok(Json(result))
}

/// `GET /api/therapists`
pub async fn therapists(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TherapistRecord>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = roster::list_therapists(&conn, &scope, &page)?;
    Ok(Json(result))
}
