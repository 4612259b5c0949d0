//! Therapy sessions and their 1:1 progress notes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::SessionStatus;
use crate::models::{ProgressNote, TherapySession};

const SESSION_COLUMNS: &str =
    "id, plan_id, therapist_id, patient_id, session_date, duration_minutes, status";

pub struct NewSession {
    pub plan_id: i64,
    pub therapist_id: i64,
    pub patient_id: i64,
    pub session_date: DateTime<Utc>,
    pub duration_minutes: i64,
}

pub fn insert_session(conn: &Connection, session: &NewSession) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO therapy_sessions (plan_id, therapist_id, patient_id,
         session_date, duration_minutes, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session.plan_id,
            session.therapist_id,
            session.patient_id,
            session.session_date,
            session.duration_minutes,
            SessionStatus::Scheduled.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_session(conn: &Connection, id: i64) -> Result<Option<TherapySession>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM therapy_sessions WHERE id = ?1"),
            params![id],
            session_row,
        )
        .optional()?;
    row.map(session_from_row).transpose()
}

pub fn set_session_status(
    conn: &Connection,
    id: i64,
    status: SessionStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE therapy_sessions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(changed)
}

pub fn list_sessions_for_therapist(
    conn: &Connection,
    therapist_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapySession>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM therapy_sessions
         WHERE therapist_id = ?1 ORDER BY session_date LIMIT ?2 OFFSET ?3"
    ))?;
    let sessions = collect_sessions(stmt.query_map(params![therapist_id, limit, offset], session_row)?);
    sessions
}

pub fn count_sessions_for_therapist(
    conn: &Connection,
    therapist_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM therapy_sessions WHERE therapist_id = ?1",
        params![therapist_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_sessions_for_patient(
    conn: &Connection,
    patient_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapySession>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM therapy_sessions
         WHERE patient_id = ?1 ORDER BY session_date LIMIT ?2 OFFSET ?3"
    ))?;
    let sessions = collect_sessions(stmt.query_map(params![patient_id, limit, offset], session_row)?);
    sessions
}

pub fn count_sessions_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM therapy_sessions WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_sessions(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapySession>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM therapy_sessions ORDER BY session_date LIMIT ?1 OFFSET ?2"
    ))?;
    let sessions = collect_sessions(stmt.query_map(params![limit, offset], session_row)?);
    sessions
}

pub fn count_sessions(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM therapy_sessions", [], |row| row.get(0))?;
    Ok(count)
}

/// Still-scheduled sessions from `after` forward, soonest first.
pub fn upcoming_sessions_for_patient(
    conn: &Connection,
    patient_id: i64,
    after: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<TherapySession>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM therapy_sessions
         WHERE patient_id = ?1 AND session_date >= ?2 AND status = ?3
         ORDER BY session_date ASC LIMIT ?4"
    ))?;
    let sessions = collect_sessions(stmt.query_map(
        params![patient_id, after, SessionStatus::Scheduled.as_str(), limit],
        session_row,
    )?);
    sessions
}

/// Insert-or-replace the note for a session. Idempotent on session_id.
pub fn upsert_progress_note(
    conn: &Connection,
    session_id: i64,
    observations: &str,
    recommendations: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO progress_notes (session_id, observations, recommendations)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(session_id) DO UPDATE SET
             observations = excluded.observations,
             recommendations = excluded.recommendations",
        params![session_id, observations, recommendations],
    )?;
    Ok(())
}

pub fn get_progress_note(
    conn: &Connection,
    session_id: i64,
) -> Result<Option<ProgressNote>, DatabaseError> {
    let note = conn
        .query_row(
            "SELECT id, session_id, observations, recommendations
             FROM progress_notes WHERE session_id = ?1",
            params![session_id],
            |row| {
                Ok(ProgressNote {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    observations: row.get(2)?,
                    recommendations: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(note)
}

fn collect_sessions(
    rows: impl Iterator<Item = Result<SessionRow, rusqlite::Error>>,
) -> Result<Vec<TherapySession>, DatabaseError> {
    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(session_from_row(row?)?);
    }
    Ok(sessions)
}

struct SessionRow {
    id: i64,
    plan_id: i64,
    therapist_id: i64,
    patient_id: i64,
    session_date: DateTime<Utc>,
    duration_minutes: i64,
    status: String,
}

fn session_row(row: &rusqlite::Row<'_>) -> Result<SessionRow, rusqlite::Error> {
    Ok(SessionRow {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        therapist_id: row.get(2)?,
        patient_id: row.get(3)?,
        session_date: row.get(4)?,
        duration_minutes: row.get(5)?,
        status: row.get(6)?,
    })
}

fn session_from_row(row: SessionRow) -> Result<TherapySession, DatabaseError> {
    Ok(TherapySession {
        id: row.id,
        plan_id: row.plan_id,
        therapist_id: row.therapist_id,
        patient_id: row.patient_id,
        session_date: row.session_date,
        duration_minutes: row.duration_minutes,
        status: SessionStatus::from_str(&row.status)?,
    })
}
