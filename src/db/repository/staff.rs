//! Therapist, supervisor and admin profile rows.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{AdminProfile, SupervisorProfile, TherapistProfile, TherapistRecord};

pub fn insert_therapist(
    conn: &Connection,
    user_id: i64,
    specialization: &str,
    years_experience: i64,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO therapists (user_id, specialization, years_experience)
         VALUES (?1, ?2, ?3)",
        params![user_id, specialization, years_experience],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_therapist_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<TherapistProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, user_id, specialization, years_experience
             FROM therapists WHERE user_id = ?1",
            params![user_id],
            therapist_row,
        )
        .optional()?;
    Ok(profile)
}

/// The login user behind a therapist profile — notification recipient.
pub fn therapist_user_id(conn: &Connection, therapist_id: i64) -> Result<Option<i64>, DatabaseError> {
    let user_id = conn
        .query_row(
            "SELECT user_id FROM therapists WHERE id = ?1",
            params![therapist_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(user_id)
}

pub fn list_therapists(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapistRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.user_id, t.specialization, t.years_experience, u.username, u.email
         FROM therapists t JOIN users u ON u.id = t.user_id
         ORDER BY t.id LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit, offset], |row| {
        Ok(TherapistRecord {
            profile: TherapistProfile {
                id: row.get(0)?,
                user_id: row.get(1)?,
                specialization: row.get(2)?,
                years_experience: row.get(3)?,
            },
            username: row.get(4)?,
            email: row.get(5)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_therapists(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM therapists", [], |row| row.get(0))?;
    Ok(count)
}

pub fn insert_supervisor(
    conn: &Connection,
    user_id: i64,
    department: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO supervisors (user_id, department) VALUES (?1, ?2)",
        params![user_id, department],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_supervisor_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<SupervisorProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, user_id, department FROM supervisors WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(SupervisorProfile {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    department: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(profile)
}

pub fn insert_admin(
    conn: &Connection,
    user_id: i64,
    department: &str,
    access_level: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO admins (user_id, department, access_level) VALUES (?1, ?2, ?3)",
        params![user_id, department, access_level],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_admin_by_user(
    conn: &Connection,
    user_id: i64,
) -> Result<Option<AdminProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            "SELECT id, user_id, department, access_level FROM admins WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(AdminProfile {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    department: row.get(2)?,
                    access_level: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(profile)
}

fn therapist_row(row: &rusqlite::Row<'_>) -> Result<TherapistProfile, rusqlite::Error> {
    Ok(TherapistProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        specialization: row.get(2)?,
        years_experience: row.get(3)?,
    })
}
