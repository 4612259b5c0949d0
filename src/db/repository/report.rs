use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::ProgressReport;

pub fn insert_report(
    conn: &Connection,
    patient_id: i64,
    report_date: NaiveDate,
    summary: &str,
    overall_progress: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO progress_reports (patient_id, report_date, summary, overall_progress)
         VALUES (?1, ?2, ?3, ?4)",
        params![patient_id, report_date, summary, overall_progress],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_reports_for_patient(
    conn: &Connection,
    patient_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProgressReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, report_date, summary, overall_progress
         FROM progress_reports WHERE patient_id = ?1
         ORDER BY report_date DESC, id DESC LIMIT ?2 OFFSET ?3",
    )?;
    let rows = stmt.query_map(params![patient_id, limit, offset], report_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_reports_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM progress_reports WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn report_row(row: &rusqlite::Row<'_>) -> Result<ProgressReport, rusqlite::Error> {
    Ok(ProgressReport {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        report_date: row.get(2)?,
        summary: row.get(3)?,
        overall_progress: row.get(4)?,
    })
}
