//! Operation-level error taxonomy, shared by every data-access and
//! workflow operation. The HTTP layer maps these onto status codes.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Email or username already exists")]
    DuplicateIdentity,

    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Operation not permitted for this role")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}
