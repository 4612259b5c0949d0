//! Therapy plan routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::endpoints::db_scope;
use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::models::page::{Page, PageRequest};
use crate::models::TherapyPlan;
use crate::plans::{self, NewPlanRequest, ReviewOutcome, ReviewRequest};
use crate::state::AppState;

/// `GET /api/plans`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<TherapyPlan>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = plans::list_plans(&conn, &scope, &page)?;
    Ok(Json(result))
}

/// `POST /api/plans`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<NewPlanRequest>,
) -> Result<(StatusCode, Json<TherapyPlan>), ApiError> {
    let (mut conn, scope) = db_scope(&state, &user)?;
    let plan = plans::create_plan(&mut conn, &scope, &body)?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /api/plans/:id`
pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(plan_id): Path<i64>,
) -> Result<Json<TherapyPlan>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let plan = plans::get_plan(&conn, &scope, plan_id)?;
    Ok(Json(plan))
}

/// `POST /api/plans/:id/review`
pub async fn review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(plan_id): Path<i64>,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let (mut conn, scope) = db_scope(&state, &user)?;
    let outcome = plans::review_plan(&mut conn, &scope, plan_id, &body)?;
    Ok(Json(outcome))
}
