//! Shared fixtures for service and endpoint tests.

use rusqlite::Connection;

use crate::accounts::{self, NewAccount, RoleAttributes};
use crate::auth::SessionClaims;
use crate::db::repository::{patient, staff, user};
use crate::models::{PatientProfile, TherapistProfile};
use crate::scope::Scope;

pub fn signup(conn: &mut Connection, username: &str, role: &str) -> i64 {
    let attributes = match role {
        "therapist" => RoleAttributes {
            specialization: Some("Articulation".into()),
            years_experience: Some(5),
            ..Default::default()
        },
        "supervisor" => RoleAttributes {
            department: Some("Clinical".into()),
            ..Default::default()
        },
        _ => RoleAttributes::default(),
    };
    accounts::create_account(
        conn,
        &NewAccount {
            username: username.into(),
            email: format!("{username}@clinic.test"),
            password: "hunter2hunter2".into(),
            role: role.into(),
            attributes,
        },
    )
    .unwrap()
}

pub fn scope_for(conn: &Connection, user_id: i64) -> Scope {
    let u = user::get_user(conn, user_id).unwrap().unwrap();
    Scope::resolve(conn, &SessionClaims { user_id, role: u.role }).unwrap()
}

pub fn therapist_of(conn: &Connection, user_id: i64) -> TherapistProfile {
    staff::get_therapist_by_user(conn, user_id).unwrap().unwrap()
}

pub fn patient_of(conn: &Connection, user_id: i64) -> PatientProfile {
    patient::get_patient_by_user(conn, user_id).unwrap().unwrap()
}

/// A supervisor, a therapist, and a patient already allocated to them.
pub struct Clinic {
    pub supervisor_user: i64,
    pub therapist_user: i64,
    pub patient_user: i64,
    pub therapist_id: i64,
    pub patient_id: i64,
}

pub fn seed_clinic(conn: &mut Connection) -> Clinic {
    let supervisor_user = signup(conn, "sup", "supervisor");
    let therapist_user = signup(conn, "ther", "therapist");
    let patient_user = signup(conn, "pat", "patient");
    let therapist_id = therapist_of(conn, therapist_user).id;
    let patient_id = patient_of(conn, patient_user).id;
    let scope = scope_for(conn, supervisor_user);
    crate::allocation::allocate(conn, &scope, patient_id, therapist_id).unwrap();
    Clinic {
        supervisor_user,
        therapist_user,
        patient_user,
        therapist_id,
        patient_id,
    }
}
