//! Caller scope resolution and the per-role visibility predicates.
//!
//! Every data-access operation receives a resolved `Scope` instead of raw
//! session claims, and every scope check lives here — not at call sites —
//! so a forgotten filter cannot silently widen a query.
//!
//! Cross-tenant probes are answered with NotFound rather than Forbidden:
//! a caller outside a resource's scope must not learn that the resource
//! exists. Forbidden is reserved for operations a role can never perform.

use rusqlite::Connection;

use crate::auth::SessionClaims;
use crate::db::repository::{patient, staff};
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::{PatientProfile, PatientRecord};

/// A caller's resolved visibility scope: role plus the role-profile row id
/// that anchors its data slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Patient { patient_id: i64, user_id: i64 },
    Therapist { therapist_id: i64, user_id: i64 },
    Supervisor { supervisor_id: i64, user_id: i64 },
    Admin { user_id: i64 },
}

impl Scope {
    /// Resolve session claims into a scope by loading the caller's
    /// role-profile row. A user whose profile row is missing cannot act.
    pub fn resolve(conn: &Connection, claims: &SessionClaims) -> Result<Self, ServiceError> {
        let user_id = claims.user_id;
        match claims.role {
            Role::Patient => {
                let profile = patient::get_patient_by_user(conn, user_id)?
                    .ok_or(ServiceError::InvalidSession)?;
                Ok(Scope::Patient {
                    patient_id: profile.id,
                    user_id,
                })
            }
            Role::Therapist => {
                let profile = staff::get_therapist_by_user(conn, user_id)?
                    .ok_or(ServiceError::InvalidSession)?;
                Ok(Scope::Therapist {
                    therapist_id: profile.id,
                    user_id,
                })
            }
            Role::Supervisor => {
                let profile = staff::get_supervisor_by_user(conn, user_id)?
                    .ok_or(ServiceError::InvalidSession)?;
                Ok(Scope::Supervisor {
                    supervisor_id: profile.id,
                    user_id,
                })
            }
            Role::Admin => {
                staff::get_admin_by_user(conn, user_id)?.ok_or(ServiceError::InvalidSession)?;
                Ok(Scope::Admin { user_id })
            }
        }
    }

    pub fn user_id(&self) -> i64 {
        match *self {
            Scope::Patient { user_id, .. }
            | Scope::Therapist { user_id, .. }
            | Scope::Supervisor { user_id, .. }
            | Scope::Admin { user_id } => user_id,
        }
    }

    /// Oversight roles see every row; others only their slice.
    pub fn is_oversight(&self) -> bool {
        matches!(self, Scope::Supervisor { .. } | Scope::Admin { .. })
    }

    /// The caller's supervisor profile id, required for mutations that
    /// stamp `supervisor_id`. Forbidden for every other role.
    pub fn require_supervisor(&self) -> Result<i64, ServiceError> {
        match *self {
            Scope::Supervisor { supervisor_id, .. } => Ok(supervisor_id),
            _ => Err(ServiceError::Forbidden),
        }
    }

    /// The caller's therapist profile id, required for therapist-authored
    /// mutations. Forbidden for every other role.
    pub fn require_therapist(&self) -> Result<i64, ServiceError> {
        match *self {
            Scope::Therapist { therapist_id, .. } => Ok(therapist_id),
            _ => Err(ServiceError::Forbidden),
        }
    }

    pub fn require_oversight(&self) -> Result<(), ServiceError> {
        if self.is_oversight() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        match self {
            Scope::Admin { .. } => Ok(()),
            _ => Err(ServiceError::Forbidden),
        }
    }

    /// Whether this scope may read the given patient's records.
    pub fn can_view_patient(&self, profile: &PatientProfile) -> bool {
        match *self {
            Scope::Patient { patient_id, .. } => patient_id == profile.id,
            Scope::Therapist { therapist_id, .. } => profile.therapist_id == Some(therapist_id),
            Scope::Supervisor { .. } | Scope::Admin { .. } => true,
        }
    }

    /// Whether this scope may read rows belonging to the given patient and
    /// therapist ids (plans, sessions).
    pub fn can_view_clinical(&self, row_patient_id: i64, row_therapist_id: i64) -> bool {
        match *self {
            Scope::Patient { patient_id, .. } => patient_id == row_patient_id,
            Scope::Therapist { therapist_id, .. } => therapist_id == row_therapist_id,
            Scope::Supervisor { .. } | Scope::Admin { .. } => true,
        }
    }
}

/// Load a patient and apply the caller's scope predicate. Out-of-scope and
/// nonexistent patients are indistinguishable to the caller.
pub fn scoped_patient(
    conn: &Connection,
    scope: &Scope,
    patient_id: i64,
) -> Result<PatientRecord, ServiceError> {
    let record = patient::get_patient(conn, patient_id)?
        .ok_or_else(|| ServiceError::not_found("patient", patient_id))?;
    if !scope.can_view_patient(&record.profile) {
        return Err(ServiceError::not_found("patient", patient_id));
    }
    Ok(record)
}
