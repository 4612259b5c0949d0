use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::ClinicalRating;

pub fn insert_rating(
    conn: &Connection,
    supervisor_id: i64,
    therapy_plan_id: i64,
    rating_score: i64,
    feedback: &str,
    rating_date: NaiveDate,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO clinical_ratings (supervisor_id, therapy_plan_id, rating_score,
         feedback, rating_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![supervisor_id, therapy_plan_id, rating_score, feedback, rating_date],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_rating(conn: &Connection, id: i64) -> Result<Option<ClinicalRating>, DatabaseError> {
    use rusqlite::OptionalExtension;
    let rating = conn
        .query_row(
            "SELECT id, supervisor_id, therapy_plan_id, rating_score, feedback, rating_date
             FROM clinical_ratings WHERE id = ?1",
            params![id],
            rating_row,
        )
        .optional()?;
    Ok(rating)
}

pub fn list_ratings_for_plan(
    conn: &Connection,
    therapy_plan_id: i64,
) -> Result<Vec<ClinicalRating>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, supervisor_id, therapy_plan_id, rating_score, feedback, rating_date
         FROM clinical_ratings WHERE therapy_plan_id = ?1 ORDER BY rating_date DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![therapy_plan_id], rating_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn rating_row(row: &rusqlite::Row<'_>) -> Result<ClinicalRating, rusqlite::Error> {
    Ok(ClinicalRating {
        id: row.get(0)?,
        supervisor_id: row.get(1)?,
        therapy_plan_id: row.get(2)?,
        rating_score: row.get(3)?,
        feedback: row.get(4)?,
        rating_date: row.get(5)?,
    })
}
