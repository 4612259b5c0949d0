//! Progress reports and the aggregated patient overview.

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::repository::{plan, rating, report, session};
use crate::error::ServiceError;
use crate::models::page::{Page, PageRequest};
use crate::models::{
    ClinicalRating, PatientRecord, ProgressNote, ProgressReport, TherapyPlan, TherapySession,
};
use crate::scope::{self, Scope};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReportRequest {
    pub summary: String,
    pub overall_progress: String,
}

/// File a progress report for a patient in the caller's scope. Therapists
/// write reports for their own caseload; oversight roles for anyone.
pub fn add_report(
    conn: &Connection,
    scope: &Scope,
    patient_id: i64,
    req: &NewReportRequest,
) -> Result<ProgressReport, ServiceError> {
    if matches!(scope, Scope::Patient { .. }) {
        return Err(ServiceError::Forbidden);
    }
    scope::scoped_patient(conn, scope, patient_id)?;
    if req.summary.trim().is_empty() {
        return Err(ServiceError::Validation("summary is required".into()));
    }

    let report_date = Utc::now().date_naive();
    let id = report::insert_report(conn, patient_id, report_date, &req.summary, &req.overall_progress)?;
    tracing::info!(report_id = id, patient_id, "progress report filed");
    Ok(ProgressReport {
        id,
        patient_id,
        report_date,
        summary: req.summary.clone(),
        overall_progress: req.overall_progress.clone(),
    })
}

/// Reports for one patient, newest first, paginated.
pub fn list_reports(
    conn: &Connection,
    scope: &Scope,
    patient_id: i64,
    page: &PageRequest,
) -> Result<Page<ProgressReport>, ServiceError> {
    scope::scoped_patient(conn, scope, patient_id)?;
    let (limit, offset) = page.limit_offset();
    let data = report::list_reports_for_patient(conn, patient_id, limit, offset)?;
    let total = report::count_reports_for_patient(conn, patient_id)?;
    Ok(Page::new(data, page, total))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithNote {
    #[serde(flatten)]
    pub session: TherapySession,
    pub note: Option<ProgressNote>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanWithRatings {
    #[serde(flatten)]
    pub plan: TherapyPlan,
    pub ratings: Vec<ClinicalRating>,
}

/// Everything a clinician needs on one screen for one patient.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientOverview {
    pub patient: PatientRecord,
    pub plans: Vec<PlanWithRatings>,
    pub recent_sessions: Vec<SessionWithNote>,
    pub reports: Vec<ProgressReport>,
}

const OVERVIEW_SESSION_LIMIT: i64 = 20;
const OVERVIEW_REPORT_LIMIT: i64 = 10;

/// Assemble the cross-entity overview, masked by scope like any single read.
pub fn patient_overview(
    conn: &Connection,
    scope: &Scope,
    patient_id: i64,
) -> Result<PatientOverview, ServiceError> {
    let patient = scope::scoped_patient(conn, scope, patient_id)?;

    let plan_rows = plan::list_plans_for_patient(conn, patient_id, i64::MAX, 0)?;
    let mut plans = Vec::with_capacity(plan_rows.len());
    for plan_row in plan_rows {
        let ratings = rating::list_ratings_for_plan(conn, plan_row.id)?;
        plans.push(PlanWithRatings {
            plan: plan_row,
            ratings,
        });
    }

    let session_rows =
        session::list_sessions_for_patient(conn, patient_id, OVERVIEW_SESSION_LIMIT, 0)?;
    let mut recent_sessions = Vec::with_capacity(session_rows.len());
    for session_row in session_rows {
        let note = session::get_progress_note(conn, session_row.id)?;
        recent_sessions.push(SessionWithNote {
            session: session_row,
            note,
        });
    }

    let reports = report::list_reports_for_patient(conn, patient_id, OVERVIEW_REPORT_LIMIT, 0)?;
    Ok(PatientOverview {
        patient,
        plans,
        recent_sessions,
        reports,
    })
}
