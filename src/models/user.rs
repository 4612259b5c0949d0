use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Role;

/// One row per login identity. The role tag is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Patient profile, 1:1 with a `patient`-role user. `therapist_id` is the
/// allocation link — at most one assigned therapist, reassignment overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: i64,
    pub user_id: i64,
    pub date_of_birth: Option<NaiveDate>,
    pub diagnosis: Option<String>,
    pub therapist_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistProfile {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub years_experience: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorProfile {
    pub id: i64,
    pub user_id: i64,
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: i64,
    pub user_id: i64,
    pub department: String,
    pub access_level: String,
}

/// Patient profile joined with its user row, for list screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    #[serde(flatten)]
    pub profile: PatientProfile,
    pub username: String,
    pub email: String,
}

/// Therapist profile joined with its user row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TherapistRecord {
    #[serde(flatten)]
    pub profile: TherapistProfile,
    pub username: String,
    pub email: String,
}
