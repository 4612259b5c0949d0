use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::PlanStatus;
use crate::models::TherapyPlan;

const PLAN_COLUMNS: &str =
    "id, patient_id, therapist_id, goals, activities, start_date, end_date, status";

pub struct NewPlan<'a> {
    pub patient_id: i64,
    pub therapist_id: i64,
    pub goals: &'a str,
    pub activities: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn insert_plan(conn: &Connection, plan: &NewPlan<'_>) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO therapy_plans (patient_id, therapist_id, goals, activities,
         start_date, end_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            plan.patient_id,
            plan.therapist_id,
            plan.goals,
            plan.activities,
            plan.start_date,
            plan.end_date,
            PlanStatus::Pending.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_plan(conn: &Connection, id: i64) -> Result<Option<TherapyPlan>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PLAN_COLUMNS} FROM therapy_plans WHERE id = ?1"),
            params![id],
            plan_row,
        )
        .optional()?;
    row.map(plan_from_row).transpose()
}

pub fn set_plan_status(
    conn: &Connection,
    id: i64,
    status: PlanStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE therapy_plans SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(changed)
}

pub fn list_plans_for_therapist(
    conn: &Connection,
    therapist_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapyPlan>, DatabaseError> {
    list_plans_where(
        conn,
        "WHERE therapist_id = ?1",
        params![therapist_id, limit, offset],
    )
}

pub fn count_plans_for_therapist(
    conn: &Connection,
    therapist_id: i64,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM therapy_plans WHERE therapist_id = ?1",
        params![therapist_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_plans_for_patient(
    conn: &Connection,
    patient_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapyPlan>, DatabaseError> {
    list_plans_where(
        conn,
        "WHERE patient_id = ?1",
        params![patient_id, limit, offset],
    )
}

pub fn count_plans_for_patient(conn: &Connection, patient_id: i64) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM therapy_plans WHERE patient_id = ?1",
        params![patient_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn list_plans(
    conn: &Connection,
    limit: i64,
    offset: i64,
) -> Result<Vec<TherapyPlan>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAN_COLUMNS} FROM therapy_plans ORDER BY id LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![limit, offset], plan_row)?;

    let mut plans = Vec::new();
    for row in rows {
        plans.push(plan_from_row(row?)?);
    }
    Ok(plans)
}

pub fn count_plans(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM therapy_plans", [], |row| row.get(0))?;
    Ok(count)
}

fn list_plans_where(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<TherapyPlan>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAN_COLUMNS} FROM therapy_plans {filter} ORDER BY id LIMIT ?2 OFFSET ?3"
    ))?;
    let rows = stmt.query_map(params, plan_row)?;

    let mut plans = Vec::new();
    for row in rows {
        plans.push(plan_from_row(row?)?);
    }
    Ok(plans)
}

struct PlanRow {
    id: i64,
    patient_id: i64,
    therapist_id: i64,
    goals: String,
    activities: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
}

fn plan_row(row: &rusqlite::Row<'_>) -> Result<PlanRow, rusqlite::Error> {
    Ok(PlanRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        therapist_id: row.get(2)?,
        goals: row.get(3)?,
        activities: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: row.get(7)?,
    })
}

fn plan_from_row(row: PlanRow) -> Result<TherapyPlan, DatabaseError> {
    Ok(TherapyPlan {
        id: row.id,
        patient_id: row.patient_id,
        therapist_id: row.therapist_id,
        goals: row.goals,
        activities: row.activities,
        start_date: row.start_date,
        end_date: row.end_date,
        status: PlanStatus::from_str(&row.status)?,
    })
}
