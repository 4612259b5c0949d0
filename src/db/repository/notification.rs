use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Notification;

pub fn insert_notification(
    conn: &Connection,
    user_id: i64,
    message: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (user_id, message, is_read, created_at)
         VALUES (?1, ?2, 0, ?3)",
        params![user_id, message, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// One batched multi-row insert targeting every current supervisor's user.
/// Runs inside the caller's transaction so the fan-out is all-or-nothing.
pub fn notify_all_supervisors(conn: &Connection, message: &str) -> Result<usize, DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO notifications (user_id, message, is_read, created_at)
         SELECT s.user_id, ?1, 0, ?2 FROM supervisors s",
        params![message, Utc::now()],
    )?;
    Ok(inserted)
}

pub fn list_unread(conn: &Connection, user_id: i64) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, message, is_read, created_at
         FROM notifications WHERE user_id = ?1 AND is_read = 0
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], notification_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Recipient of a notification, if it exists.
pub fn notification_recipient(conn: &Connection, id: i64) -> Result<Option<i64>, DatabaseError> {
    use rusqlite::OptionalExtension;
    let user_id = conn
        .query_row(
            "SELECT user_id FROM notifications WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(user_id)
}

/// Flip to read. Counts matched rows, so marking an already-read
/// notification still reports 1 (no-op success at the caller).
pub fn mark_read(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(changed)
}

fn notification_row(row: &rusqlite::Row<'_>) -> Result<Notification, rusqlite::Error> {
    let is_read: i64 = row.get(3)?;
    let created_at: DateTime<Utc> = row.get(4)?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        is_read: is_read != 0,
        created_at,
    })
}
