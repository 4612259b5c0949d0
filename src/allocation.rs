//! Patient-to-therapist allocation.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository::{notification, patient, staff};
use crate::error::ServiceError;
use crate::models::{PatientRecord, TherapistRecord};
use crate::scope::Scope;

/// Assign (or reassign) a patient to a therapist.
///
/// Oversight roles only. Runs as one transaction so the assignment and the
/// therapist's notification land together or not at all. Reassignment simply
/// overwrites the previous therapist.
pub fn allocate(
    conn: &mut Connection,
    scope: &Scope,
    patient_id: i64,
    therapist_id: i64,
) -> Result<(), ServiceError> {
    scope.require_oversight()?;

    let tx = conn.transaction().map_err(crate::db::DatabaseError::from)?;

    let therapist_user = staff::therapist_user_id(&tx, therapist_id)?
        .ok_or_else(|| ServiceError::not_found("therapist", therapist_id))?;
    let changed = patient::set_therapist(&tx, patient_id, therapist_id)?;
    if changed == 0 {
        return Err(ServiceError::not_found("patient", patient_id));
    }

    notification::insert_notification(
        &tx,
        therapist_user,
        &format!("You have been assigned patient {patient_id}"),
    )?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(patient_id, therapist_id, "patient allocated");
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistCaseload {
    #[serde(flatten)]
    pub therapist: TherapistRecord,
    pub patients: Vec<PatientRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOverview {
    pub caseloads: Vec<TherapistCaseload>,
    pub unassigned: Vec<PatientRecord>,
}

/// Every therapist with their current caseload, plus patients still waiting
/// for an assignment. Oversight roles only.
pub fn allocation_overview(
    conn: &Connection,
    scope: &Scope,
) -> Result<AllocationOverview, ServiceError> {
    scope.require_oversight()?;

    let therapists = staff::list_therapists(conn, i64::MAX, 0)?;
    let mut caseloads = Vec::with_capacity(therapists.len());
    for therapist in therapists {
        let patients =
            patient::list_patients_for_therapist(conn, therapist.profile.id, i64::MAX, 0)?;
        caseloads.push(TherapistCaseload { therapist, patients });
    }
    let unassigned = patient::list_unassigned_patients(conn)?;
    Ok(AllocationOverview { caseloads, unassigned })
}
