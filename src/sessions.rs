//! Scheduling and completing therapy sessions.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::repository::{notification, plan, session};
use crate::db::DatabaseError;
use crate::error::ServiceError;
use crate::models::enums::SessionStatus;
use crate::models::page::{Page, PageRequest};
use crate::models::{ProgressNote, TherapySession};
use crate::scope::Scope;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRequest {
    pub plan_id: i64,
    pub session_date: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Optional intake notes recorded at scheduling time. They seed the
    /// session's progress note; completion later replaces them.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Schedule a session under one of the caller's own plans.
///
/// The patient is stamped from the plan rather than the request, so a session
/// can never point at a different patient than its plan. The patient gets a
/// notification in the same transaction.
pub fn create_session(
    conn: &mut Connection,
    scope: &Scope,
    req: &NewSessionRequest,
) -> Result<TherapySession, ServiceError> {
    let therapist_id = scope.require_therapist()?;
    if req.duration_minutes <= 0 {
        return Err(ServiceError::Validation(
            "durationMinutes must be positive".into(),
        ));
    }

    let plan_row = match plan::get_plan(conn, req.plan_id)? {
        Some(p) if p.therapist_id == therapist_id => p,
        _ => return Err(ServiceError::not_found("therapy plan", req.plan_id)),
    };

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let session_id = session::insert_session(
        &tx,
        &session::NewSession {
            plan_id: plan_row.id,
            therapist_id,
            patient_id: plan_row.patient_id,
            session_date: req.session_date,
            duration_minutes: req.duration_minutes,
        },
    )?;
    if let Some(notes) = req.notes.as_deref() {
        session::upsert_progress_note(&tx, session_id, notes, "")?;
    }
    if let Some(patient_user) = patient_user_id(&tx, plan_row.patient_id)? {
        notification::insert_notification(
            &tx,
            patient_user,
            &format!(
                "A therapy session has been scheduled for {}",
                req.session_date.format("%Y-%m-%d %H:%M")
            ),
        )?;
    }
    tx.commit().map_err(DatabaseError::from)?;

    let created = session::get_session(conn, session_id)?
        .ok_or_else(|| ServiceError::not_found("therapy session", session_id))?;
    tracing::info!(session_id, plan_id = plan_row.id, "session scheduled");
    Ok(created)
}

fn patient_user_id(conn: &Connection, patient_id: i64) -> Result<Option<i64>, DatabaseError> {
    use rusqlite::OptionalExtension;
    let user_id = conn
        .query_row(
            "SELECT user_id FROM patients WHERE id = ?1",
            rusqlite::params![patient_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(user_id)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub observations: String,
    pub recommendations: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub session: TherapySession,
    pub note: ProgressNote,
}

/// Mark a session completed and record its progress note atomically.
///
/// Completing twice is allowed and simply replaces the note; the status
/// transition only fires the first time.
pub fn complete_session(
    conn: &mut Connection,
    scope: &Scope,
    session_id: i64,
    req: &CompletionRequest,
) -> Result<CompletedSession, ServiceError> {
    let therapist_id = scope.require_therapist()?;

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let session_row = match session::get_session(&tx, session_id)? {
        Some(s) if s.therapist_id == therapist_id => s,
        _ => return Err(ServiceError::not_found("therapy session", session_id)),
    };

    if session_row.status == SessionStatus::Scheduled {
        session::set_session_status(&tx, session_id, SessionStatus::Completed)?;
    }
    session::upsert_progress_note(&tx, session_id, &req.observations, &req.recommendations)?;
    tx.commit().map_err(DatabaseError::from)?;

    let session_row = session::get_session(conn, session_id)?
        .ok_or_else(|| ServiceError::not_found("therapy session", session_id))?;
    let note = session::get_progress_note(conn, session_id)?
        .ok_or_else(|| ServiceError::not_found("progress note", session_id))?;
    tracing::info!(session_id, "session completed");
    Ok(CompletedSession {
        session: session_row,
        note,
    })
}

/// Sessions visible to the caller, paginated.
pub fn list_sessions(
    conn: &Connection,
    scope: &Scope,
    page: &PageRequest,
) -> Result<Page<TherapySession>, ServiceError> {
    let (limit, offset) = page.limit_offset();
    let (data, total) = match scope {
        Scope::Patient { patient_id, .. } => (
            session::list_sessions_for_patient(conn, *patient_id, limit, offset)?,
            session::count_sessions_for_patient(conn, *patient_id)?,
        ),
        Scope::Therapist { therapist_id, .. } => (
            session::list_sessions_for_therapist(conn, *therapist_id, limit, offset)?,
            session::count_sessions_for_therapist(conn, *therapist_id)?,
        ),
        Scope::Supervisor { .. } | Scope::Admin { .. } => (
            session::list_sessions(conn, limit, offset)?,
            session::count_sessions(conn)?,
        ),
    };
    Ok(Page::new(data, page, total))
}

/// Scheduled sessions for a patient from now on, soonest first.
pub fn upcoming_sessions(
    conn: &Connection,
    scope: &Scope,
    patient_id: i64,
    limit: i64,
) -> Result<Vec<TherapySession>, ServiceError> {
    crate::scope::scoped_patient(conn, scope, patient_id)?;
    let sessions =
        session::upcoming_sessions_for_patient(conn, patient_id, Utc::now(), limit.clamp(1, 50))?;
    Ok(sessions)
}
