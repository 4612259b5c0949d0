pub mod auth;
pub mod notifications;
pub mod patients;
pub mod plans;
pub mod sessions;
pub mod users;

use std::sync::MutexGuard;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::api::types::AuthedUser;
use crate::scope::Scope;
use crate::state::AppState;

/// Lock the database and resolve the caller's scope in one step. Every
/// protected handler starts here.
pub(crate) fn db_scope<'a>(
    state: &'a AppState,
    user: &AuthedUser,
) -> Result<(MutexGuard<'a, Connection>, Scope), ApiError> {
    let conn = state.db.conn()?;
    let scope = Scope::resolve(&conn, &user.0).map_err(ApiError::from)?;
    Ok((conn, scope))
}
