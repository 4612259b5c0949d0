use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, last_login";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
}

pub fn insert_user(conn: &Connection, user: &NewUser<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.username,
            user.email,
            user.password_hash,
            user.role.as_str(),
            Utc::now(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Duplicate check across both identity columns, done before insert.
pub fn identity_exists(
    conn: &Connection,
    username: &str,
    email: &str,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
        params![username, email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_row,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_row,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

pub fn touch_last_login(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE users SET last_login = ?1 WHERE id = ?2",
        params![Utc::now(), id],
    )?;
    Ok(())
}

pub fn list_users_by_role(
    conn: &Connection,
    role: Role,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY id LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params![role.as_str(), limit, offset], user_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn count_users_by_role(conn: &Connection, role: Role) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1",
        params![role.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

// Internal row type so enum parsing happens outside the rusqlite closure.
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

fn user_row(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
        last_login: row.get(6)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        password_hash: row.password_hash,
        role: Role::from_str(&row.role)?,
        created_at: row.created_at,
        last_login: row.last_login,
    })
}
