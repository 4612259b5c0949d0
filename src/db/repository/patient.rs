use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{PatientProfile, PatientRecord};

const PATIENT_COLUMNS: &str =
    "p.id, p.user_id, p.date_of_birth, p.diagnosis, p.therapist_id, u.username, u.email";

pub fn insert_patient(
    conn: &Connection,
    user_id: i64,
    date_of_birth: Option<NaiveDate>,
    diagnosis: Option<&str>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (user_id, date_of_birth, diagnosis) VALUES (?1, ?2, ?3)",
        params![user_id, date_of_birth, diagnosis],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<PatientRecord>, DatabaseError> {
    let record = conn
        .query_row(
            &format!(
                "SELECT {PATIENT_COLUMNS} FROM patients p
                 JOIN users u ON u.id = p.user_id WHERE p.id = ?1"
            ),
            params![id],
            patient_record_row,
        )
        .optional()?;
    Ok(record)
}

pub fn get_patient_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<PatientProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, user_id, date_of_birth, diagnosis, therapist_id
             FROM patients WHERE user_id = ?1",
            params![user_id],
            patient_profile_row,
        )
        .optional()?;
    Ok(profile)
}

/// Overwrite the allocation link. Returns rows changed (0 = no such patient).
pub fn set_therapist(
    conn: &Connection,
    patient_id: i64,
    therapist_id: i64,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET therapist_id = ?1 WHERE id = ?2",
        params![therapist_id, patient_id],
    )?;
    Ok(changed)
}

pub fn list_patients_for_therapist(
    conn: &Connection,
    therapist_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients p
         JOIN users u ON u.id = p.user_id
         WHERE p.therapist_id = ?1 ORDER BY p.id LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params![therapist_id, limit, offset], patient_record_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_patients_for_therapist(
    conn: &Connection,
    therapist_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE therapist_id = ?1",
        params![therapist_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_patients(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<Vec<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients p
         JOIN users u ON u.id = p.user_id ORDER BY p.id LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![limit, offset], patient_record_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_unassigned_patients(conn: &Connection) -> Result<Vec<PatientRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATIENT_COLUMNS} FROM patients p
         JOIN users u ON u.id = p.user_id
         WHERE p.therapist_id IS NULL ORDER BY p.id"
    ))?;
    let rows = stmt.query_map([], patient_record_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

fn patient_profile_row(row: &rusqlite::Row<'_>) -> Result<PatientProfile, rusqlite::Error> {
    Ok(PatientProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date_of_birth: row.get(2)?,
        diagnosis: row.get(3)?,
        therapist_id: row.get(4)?,
    })
}

fn patient_record_row(row: &rusqlite::Row<'_>) -> Result<PatientRecord, rusqlite::Error> {
    Ok(PatientRecord {
        profile: PatientProfile {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date_of_birth: row.get(2)?,
            diagnosis: row.get(3)?,
            therapist_id: row.get(4)?,
        },
        username: row.get(5)?,
        email: row.get(6)?,
    })
}
