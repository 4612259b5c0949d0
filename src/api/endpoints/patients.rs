//! Patient-centric routes: roster, overview, upcoming sessions, reports,
//! and allocation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::allocation::{self, AllocationOverview};
use crate::api::endpoints::db_scope;
use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::models::page::{Page, PageRequest};
use crate::models::{PatientRecord, ProgressReport, TherapySession};
use crate::reports::{self, NewReportRequest, PatientOverview};
use crate::sessions;
use crate::state::AppState;

/// `GET /api/patients`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PatientRecord>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = crate::roster::list_patients(&conn, &scope, &page)?;
    Ok(Json(result))
}

/// `GET /api/patients/:id/overview`
pub async fn overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<i64>,
) -> Result<Json<PatientOverview>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = reports::patient_overview(&conn, &scope, patient_id)?;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

/// `GET /api/patients/:id/sessions/upcoming`
pub async fn upcoming_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<i64>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<TherapySession>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result =
        sessions::upcoming_sessions(&conn, &scope, patient_id, query.limit.unwrap_or(10))?;
    Ok(Json(result))
}

/// `GET /api/patients/:id/reports`
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<ProgressReport>>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = reports::list_reports(&conn, &scope, patient_id, &page)?;
    Ok(Json(result))
}

/// `POST /api/patients/:id/reports`
pub async fn add_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<i64>,
    Json(body): Json<NewReportRequest>,
) -> Result<(StatusCode, Json<ProgressReport>), ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let report = reports::add_report(&conn, &scope, patient_id, &body)?;
    Ok((StatusCode::CREATED, Json(report)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    pub therapist_id: i64,
}

/// `POST /api/patients/:id/allocate`
pub async fn allocate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<i64>,
    Json(body): Json<AllocateRequest>,
) -> Result<StatusCode, ApiError> {
    let (mut conn, scope) = db_scope(&state, &user)?;
    allocation::allocate(&mut conn, &scope, patient_id, body.therapist_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/allocations/overview`
pub async fn allocation_overview(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<AllocationOverview>, ApiError> {
    let (conn, scope) = db_scope(&state, &user)?;
    let result = allocation::allocation_overview(&conn, &scope)?;
    Ok(Json(result))
}
