//! Account creation and credential verification.

use rusqlite::Connection;
use serde::Deserialize;

use crate::auth::{self, SessionStore};
use crate::db::repository::{patient, staff, user};
use crate::error::ServiceError;
use crate::models::enums::Role;
use crate::models::User;

/// Role-specific attributes supplied at signup. Which fields are required
/// depends on the role tag; unknown tags are rejected before any insert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAttributes {
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub diagnosis: Option<String>,
    pub specialization: Option<String>,
    pub years_experience: Option<i64>,
    pub department: Option<String>,
    pub access_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub attributes: RoleAttributes,
}

/// Create a login identity plus its role profile in one transaction.
///
/// Fails with DuplicateIdentity when the email **or** username is already
/// taken — both are checked before the insert, and the unique constraints
/// back the check up under concurrent writers.
pub fn create_account(conn: &mut Connection, account: &NewAccount) -> Result<i64, ServiceError> {
    let role: Role = account
        .role
        .parse()
        .map_err(|_| ServiceError::Validation(format!("unknown role: {}", account.role)))?;
    validate_identity(account)?;

    if user::identity_exists(conn, &account.username, &account.email)? {
        return Err(ServiceError::DuplicateIdentity);
    }

    let password_hash = auth::hash_password(&account.password);
    let tx = conn.transaction().map_err(crate::db::DatabaseError::from)?;

    let user_id = user::insert_user(
        &tx,
        &user::NewUser {
            username: &account.username,
            email: &account.email,
            password_hash: &password_hash,
            role,
        },
    )
    .map_err(|e| {
        if e.is_unique_violation() {
            ServiceError::DuplicateIdentity
        } else {
            ServiceError::Database(e)
        }
    })?;

    create_role_profile(&tx, user_id, role, &account.attributes)?;
    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(user_id, role = role.as_str(), "account created");
    Ok(user_id)
}

/// Static mapping from role tag to required profile attributes.
fn create_role_profile(
    conn: &Connection,
    user_id: i64,
    role: Role,
    attrs: &RoleAttributes,
) -> Result<(), ServiceError> {
    match role {
        Role::Patient => {
            patient::insert_patient(
                conn,
                user_id,
                attrs.date_of_birth,
                attrs.diagnosis.as_deref(),
            )?;
        }
        Role::Therapist => {
            let specialization = attrs
                .specialization
                .as_deref()
                .ok_or_else(|| missing("specialization", role))?;
            staff::insert_therapist(
                conn,
                user_id,
                specialization,
                attrs.years_experience.unwrap_or(0),
            )?;
        }
        Role::Supervisor => {
            let department = attrs
                .department
                .as_deref()
                .ok_or_else(|| missing("department", role))?;
            staff::insert_supervisor(conn, user_id, department)?;
        }
        Role::Admin => {
            staff::insert_admin(
                conn,
                user_id,
                attrs.department.as_deref().unwrap_or("General"),
                attrs.access_level.as_deref().unwrap_or("Full"),
            )?;
        }
    }
    Ok(())
}

fn missing(field: &str, role: Role) -> ServiceError {
    ServiceError::Validation(format!("{field} is required for role {}", role.as_str()))
}

fn validate_identity(account: &NewAccount) -> Result<(), ServiceError> {
    if account.username.trim().is_empty() {
        return Err(ServiceError::Validation("username is required".into()));
    }
    if account.email.trim().is_empty() || !account.email.contains('@') {
        return Err(ServiceError::Validation("a valid email is required".into()));
    }
    if account.password.len() < 8 {
        return Err(ServiceError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

/// Verify credentials and issue a session token.
///
/// Unknown email and wrong password collapse into the same
/// InvalidCredentials so responses cannot enumerate users.
pub fn authenticate(
    conn: &Connection,
    sessions: &mut SessionStore,
    email: &str,
    password: &str,
) -> Result<(String, User), ServiceError> {
    let user = match user::find_user_by_email(conn, email)? {
        Some(user) => user,
        None => return Err(ServiceError::InvalidCredentials),
    };

    if !auth::verify_password(password, &user.password_hash) {
        return Err(ServiceError::InvalidCredentials);
    }

    user::touch_last_login(conn, user.id)?;
    let token = sessions.issue(user.id, user.role);
    tracing::debug!(user_id = user.id, "login");
    Ok((token, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn account(username: &str, email: &str, role: &str) -> NewAccount {
        let attributes = match role {
            "therapist" => RoleAttributes {
                specialization: Some("Fluency Disorders".into()),
                years_experience: Some(4),
                ..Default::default()
            },
            "supervisor" => RoleAttributes {
                department: Some("Quality Assurance".into()),
                ..Default::default()
            },
            _ => RoleAttributes::default(),
        };
        NewAccount {
            username: username.into(),
            email: email.into(),
            password: "hunter2hunter2".into(),
            role: role.into(),
            attributes,
        }
    }

    #[test]
    fn create_then_authenticate() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let mut sessions = SessionStore::new();

        let id = create_account(&mut conn, &account("ana", "ana@clinic.test", "patient")).unwrap();
        let (token, user) =
            authenticate(&conn, &mut sessions, "ana@clinic.test", "hunter2hunter2").unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Patient);
        assert!(!token.is_empty());
        // last_login stamped on success
        let reloaded = user::get_user(&conn, id).unwrap().unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[test]
    fn duplicate_email_rejected_without_insert() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        create_account(&mut conn, &account("ana", "ana@clinic.test", "patient")).unwrap();

        let result = create_account(&mut conn, &account("other", "ana@clinic.test", "patient"));
        assert!(matches!(result, Err(ServiceError::DuplicateIdentity)));
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn duplicate_username_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        create_account(&mut conn, &account("ana", "ana@clinic.test", "patient")).unwrap();

        let result = create_account(&mut conn, &account("ana", "other@clinic.test", "patient"));
        assert!(matches!(result, Err(ServiceError::DuplicateIdentity)));
    }

    #[test]
    fn unknown_role_is_validation_error() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let result = create_account(&mut conn, &account("eve", "eve@clinic.test", "superuser"));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn therapist_requires_specialization() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let mut acc = account("tom", "tom@clinic.test", "therapist");
        acc.attributes.specialization = None;
        let result = create_account(&mut conn, &acc);
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        // Failed profile creation rolls the user row back too.
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn wrong_password_and_unknown_email_collapse() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let mut sessions = SessionStore::new();
        create_account(&mut conn, &account("ana", "ana@clinic.test", "patient")).unwrap();

        let wrong_pw = authenticate(&conn, &mut sessions, "ana@clinic.test", "wrong-password");
        let no_user = authenticate(&conn, &mut sessions, "ghost@clinic.test", "whatever123");
        assert!(matches!(wrong_pw, Err(ServiceError::InvalidCredentials)));
        assert!(matches!(no_user, Err(ServiceError::InvalidCredentials)));
    }

    #[test]
    fn role_profile_created_alongside_user() {
        let db = Database::open_in_memory().unwrap();
        let mut conn = db.conn().unwrap();
        let id = create_account(&mut conn, &account("sup", "sup@clinic.test", "supervisor")).unwrap();
        assert!(staff::get_supervisor_by_user(&conn, id).unwrap().is_some());
    }
}
