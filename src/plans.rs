//! Therapy plan lifecycle: drafting by therapists, review by supervisors.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::db::repository::{notification, patient, plan, rating, staff};
use crate::db::DatabaseError;
use crate::error::ServiceError;
use crate::models::enums::PlanStatus;
use crate::models::page::{Page, PageRequest};
use crate::models::{ClinicalRating, TherapyPlan};
use crate::scope::Scope;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlanRequest {
    pub patient_id: i64,
    pub goals: String,
    pub activities: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Draft a plan for one of the caller's own patients.
///
/// The plan starts `pending`; every supervisor gets a notification in the
/// same transaction so the review queue and the plan can never drift apart.
pub fn create_plan(
    conn: &mut Connection,
    scope: &Scope,
    req: &NewPlanRequest,
) -> Result<TherapyPlan, ServiceError> {
    let therapist_id = scope.require_therapist()?;
    if req.end_date < req.start_date {
        return Err(ServiceError::Validation(
            "endDate must not precede startDate".into(),
        ));
    }
    if req.goals.trim().is_empty() {
        return Err(ServiceError::Validation("goals are required".into()));
    }

    // A patient outside the caller's caseload looks like NotFound, the same
    // answer a nonexistent id gets.
    let record = match patient::get_patient(conn, req.patient_id)? {
        Some(r) if r.profile.therapist_id == Some(therapist_id) => r,
        _ => return Err(ServiceError::not_found("patient", req.patient_id)),
    };

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let plan_id = plan::insert_plan(
        &tx,
        &plan::NewPlan {
            patient_id: record.profile.id,
            therapist_id,
            goals: &req.goals,
            activities: &req.activities,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )?;
    notification::notify_all_supervisors(
        &tx,
        &format!("Therapy plan {plan_id} is awaiting review"),
    )?;
    tx.commit().map_err(DatabaseError::from)?;

    let created = plan::get_plan(conn, plan_id)?
        .ok_or_else(|| ServiceError::not_found("therapy plan", plan_id))?;
    tracing::info!(plan_id, therapist_id, "plan drafted");
    Ok(created)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub rating_score: i64,
    pub feedback: String,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub plan: TherapyPlan,
    pub rating: ClinicalRating,
}

/// Approve a pending plan, recording the clinical rating and telling the
/// drafting therapist. Re-reviewing an already approved plan appends another
/// rating without touching the status.
pub fn review_plan(
    conn: &mut Connection,
    scope: &Scope,
    plan_id: i64,
    req: &ReviewRequest,
) -> Result<ReviewOutcome, ServiceError> {
    let supervisor_id = scope.require_supervisor()?;
    if !(1..=10).contains(&req.rating_score) {
        return Err(ServiceError::Validation(
            "ratingScore must be between 1 and 10".into(),
        ));
    }

    let tx = conn.transaction().map_err(DatabaseError::from)?;
    let plan_row = plan::get_plan(&tx, plan_id)?
        .ok_or_else(|| ServiceError::not_found("therapy plan", plan_id))?;

    if plan_row.status == PlanStatus::Pending {
        plan::set_plan_status(&tx, plan_id, PlanStatus::Approved)?;
    }
    let rating_id = rating::insert_rating(
        &tx,
        supervisor_id,
        plan_id,
        req.rating_score,
        &req.feedback,
        Utc::now().date_naive(),
    )?;
    if let Some(therapist_user) = staff::therapist_user_id(&tx, plan_row.therapist_id)? {
        notification::insert_notification(
            &tx,
            therapist_user,
            &format!("Therapy plan {plan_id} has been reviewed"),
        )?;
    }
    tx.commit().map_err(DatabaseError::from)?;

    let plan_row = plan::get_plan(conn, plan_id)?
        .ok_or_else(|| ServiceError::not_found("therapy plan", plan_id))?;
    let rating_row = rating::get_rating(conn, rating_id)?
        .ok_or_else(|| ServiceError::not_found("clinical rating", rating_id))?;
    tracing::info!(plan_id, supervisor_id, "plan reviewed");
    Ok(ReviewOutcome {
        plan: plan_row,
        rating: rating_row,
    })
}

/// Plans visible to the caller, paginated. Patients see their own, therapists
/// their caseload's, oversight roles everything.
pub fn list_plans(
    conn: &Connection,
    scope: &Scope,
    page: &PageRequest,
) -> Result<Page<TherapyPlan>, ServiceError> {
    let (limit, offset) = page.limit_offset();
    let (data, total) = match scope {
        Scope::Patient { patient_id, .. } => (
            plan::list_plans_for_patient(conn, *patient_id, limit, offset)?,
            plan::count_plans_for_patient(conn, *patient_id)?,
        ),
        Scope::Therapist { therapist_id, .. } => (
            plan::list_plans_for_therapist(conn, *therapist_id, limit, offset)?,
            plan::count_plans_for_therapist(conn, *therapist_id)?,
        ),
        Scope::Supervisor { .. } | Scope::Admin { .. } => {
            (plan::list_plans(conn, limit, offset)?, plan::count_plans(conn)?)
        }
    };
    Ok(Page::new(data, page, total))
}

/// Fetch one plan, masked by visibility.
pub fn get_plan(conn: &Connection, scope: &Scope, plan_id: i64) -> Result<TherapyPlan, ServiceError> {
    let plan_row = plan::get_plan(conn, plan_id)?
        .ok_or_else(|| ServiceError::not_found("therapy plan", plan_id))?;
    if !scope.can_view_clinical(plan_row.patient_id, plan_row.therapist_id) {
        return Err(ServiceError::not_found("therapy plan", plan_id));
    }
    Ok(plan_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::testutil::{scope_for, seed_clinic, signup};

    fn draft(patient_id: i64) -> NewPlanRequest {
        NewPlanRequest {
            patient_id,
            goals: "Produce /r/ in single words".into(),
            activities: "Mirror drills, minimal pairs".into(),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 27).unwrap(),
        }
    }

    #[test]
    fn draft_starts_pending_and_fans_out_to_supervisors() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let second_sup = signup(&mut conn, "sup2", "supervisor");
        let scope = scope_for(&conn, clinic.therapist_user);

        let created = create_plan(&mut conn, &scope, &draft(clinic.patient_id)).unwrap();
        assert_eq!(created.status, PlanStatus::Pending);

        for sup in [clinic.supervisor_user, second_sup] {
            let unread = notification::list_unread(&conn, sup).unwrap();
            assert_eq!(unread.len(), 1, "supervisor {sup} should be notified");
        }
    }

    #[test]
    fn draft_for_foreign_patient_masked_as_not_found() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let outsider = signup(&mut conn, "ther2", "therapist");
        let scope = scope_for(&conn, outsider);

        let result = create_plan(&mut conn, &scope, &draft(clinic.patient_id));
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));
    }

    #[test]
    fn draft_rejects_inverted_dates() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let scope = scope_for(&conn, clinic.therapist_user);

        let mut req = draft(clinic.patient_id);
        req.end_date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let result = create_plan(&mut conn, &scope, &req);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn review_approves_rates_and_notifies_therapist() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let ther_scope = scope_for(&conn, clinic.therapist_user);
        let created = create_plan(&mut conn, &ther_scope, &draft(clinic.patient_id)).unwrap();

        let sup_scope = scope_for(&conn, clinic.supervisor_user);
        let reviewed = review_plan(
            &mut conn,
            &sup_scope,
            created.id,
            &ReviewRequest {
                rating_score: 8,
                feedback: "Well structured goals".into(),
            },
        )
        .unwrap();
        assert_eq!(reviewed.plan.status, PlanStatus::Approved);
        assert_eq!(reviewed.rating.rating_score, 8);

        let ratings = rating::list_ratings_for_plan(&conn, created.id).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rating_score, 8);

        // allocation produced one notification, review adds one more
        let unread = notification::list_unread(&conn, clinic.therapist_user).unwrap();
        assert_eq!(unread.len(), 2);
    }

    #[test]
    fn review_of_missing_plan_creates_nothing() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let sup_scope = scope_for(&conn, clinic.supervisor_user);

        let result = review_plan(
            &mut conn,
            &sup_scope,
            4242,
            &ReviewRequest {
                rating_score: 5,
                feedback: "n/a".into(),
            },
        );
        assert!(matches!(result, Err(ServiceError::NotFound { .. })));

        let ratings: i64 = conn
            .query_row("SELECT COUNT(*) FROM clinical_ratings", [], |r| r.get(0))
            .unwrap();
        let notifications: i64 = conn
            .query_row("SELECT COUNT(*) FROM notifications", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ratings, 0);
        // only the allocation notification from the fixture
        assert_eq!(notifications, 1);
    }

    #[test]
    fn review_rejects_out_of_range_score() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let sup_scope = scope_for(&conn, clinic.supervisor_user);
        for score in [0, 11] {
            let result = review_plan(
                &mut conn,
                &sup_scope,
                1,
                &ReviewRequest {
                    rating_score: score,
                    feedback: String::new(),
                },
            );
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }
    }

    #[test]
    fn re_review_appends_rating_without_status_change() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let ther_scope = scope_for(&conn, clinic.therapist_user);
        let created = create_plan(&mut conn, &ther_scope, &draft(clinic.patient_id)).unwrap();
        let sup_scope = scope_for(&conn, clinic.supervisor_user);

        let req = ReviewRequest {
            rating_score: 7,
            feedback: "First pass".into(),
        };
        review_plan(&mut conn, &sup_scope, created.id, &req).unwrap();
        let again = review_plan(&mut conn, &sup_scope, created.id, &req).unwrap();

        assert_eq!(again.plan.status, PlanStatus::Approved);
        assert_eq!(rating::list_ratings_for_plan(&conn, created.id).unwrap().len(), 2);
    }

    #[test]
    fn plan_listing_is_scoped() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let clinic = seed_clinic(&mut conn);
        let ther_scope = scope_for(&conn, clinic.therapist_user);
        create_plan(&mut conn, &ther_scope, &draft(clinic.patient_id)).unwrap();

        let outsider = signup(&mut conn, "ther2", "therapist");
        let outsider_scope = scope_for(&conn, outsider);

        let page = PageRequest::default();
        assert_eq!(list_plans(&conn, &ther_scope, &page).unwrap().data.len(), 1);
        assert_eq!(list_plans(&conn, &outsider_scope, &page).unwrap().data.len(), 0);

        let pat_scope = scope_for(&conn, clinic.patient_user);
        assert_eq!(list_plans(&conn, &pat_scope, &page).unwrap().data.len(), 1);
    }
}
