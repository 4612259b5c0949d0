use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{PlanStatus, SessionStatus};

/// Goal/activity record authored by a therapist for an allocated patient,
/// subject to supervisor review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapyPlan {
    pub id: i64,
    pub patient_id: i64,
    pub therapist_id: i64,
    pub goals: String,
    pub activities: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PlanStatus,
}

/// Appointment instance under a plan. The patient is stamped from the plan
/// at creation time and must always match it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapySession {
    pub id: i64,
    pub plan_id: i64,
    pub therapist_id: i64,
    pub patient_id: i64,
    pub session_date: DateTime<Utc>,
    pub duration_minutes: i64,
    pub status: SessionStatus,
}

/// 1:1 with a completed session; written via upsert, idempotent on session_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    pub id: i64,
    pub session_id: i64,
    pub observations: String,
    pub recommendations: String,
}

/// Periodic per-patient snapshot, independent of sessions. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub id: i64,
    pub patient_id: i64,
    pub report_date: NaiveDate,
    pub summary: String,
    pub overall_progress: String,
}

/// Supervisor's scored feedback on a plan. Append-only, many per plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRating {
    pub id: i64,
    pub supervisor_id: i64,
    pub therapy_plan_id: i64,
    pub rating_score: i64,
    pub feedback: String,
    pub rating_date: NaiveDate,
}
