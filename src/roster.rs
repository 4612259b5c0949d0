//! Scoped directory listings.

use rusqlite::Connection;

use crate::db::repository::{patient, staff, user};
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::page::{Page, PageRequest};
use crate::models::{PatientRecord, TherapistRecord, User};
use crate::scope::Scope;

/// Patients visible to the caller. Therapists get their caseload, oversight
/// roles the whole clinic. Patient callers are refused outright.
pub fn list_patients(
    conn: &Connection,
    scope: &Scope,
    page: &PageRequest,
) -> Result<Page<PatientRecord>, ServiceError> {
    let (limit, offset) = page.limit_offset();
    let (data, total) = match scope {
        Scope::Patient { .. } => return Err(ServiceError::Forbidden),
        Scope::Therapist { therapist_id, .. } => (
            patient::list_patients_for_therapist(conn, *therapist_id, limit, offset)?,
            patient::count_patients_for_therapist(conn, *therapist_id)?,
        ),
        Scope::Supervisor { .. } | Scope::Admin { .. } => {
            (patient::list_patients(conn, limit, offset)?, patient::count_patients(conn)?)
        }
    };
    Ok(Page::new(data, page, total))
}

/// All therapists. Oversight roles only.
pub fn list_therapists(
    conn: &Connection,
    scope: &Scope,
    page: &PageRequest,
) -> Result<Page<TherapistRecord>, ServiceError> {
    scope.require_oversight()?;
    let (limit, offset) = page.limit_offset();
    let data = staff::list_therapists(conn, limit, offset)?;
    let total = staff::count_therapists(conn)?;
    Ok(Page::new(data, page, total))
}

/// The raw user table filtered by role. Admin only; password hashes never
/// serialize.
pub fn list_users(
    conn: &Connection,
    scope: &Scope,
    role: Role,
    page: &PageRequest,
) -> Result<Page<User>, ServiceError> {
    scope.require_admin()?;
    let (limit, offset) = page.limit_offset();
    let data = user::list_users_by_role(conn, role, limit, offset)?;
    let total = user::count_users_by_role(conn, role)?;
    Ok(Page::new(data, page, total))
}
