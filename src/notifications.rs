//! Reading and acknowledging notifications. Strictly own-inbox.

use rusqlite::Connection;

use crate::db::repository::notification;
use crate::error::ServiceError;
use crate::models::Notification;
use crate::scope::Scope;

pub fn list_unread(conn: &Connection, scope: &Scope) -> Result<Vec<Notification>, ServiceError> {
    let notifications = notification::list_unread(conn, scope.user_id())?;
    Ok(notifications)
}

/// Acknowledge one notification. Another user's notification is reported as
/// NotFound, never Forbidden, so ids cannot be probed. Already-read is a
/// silent success.
pub fn mark_read(conn: &Connection, scope: &Scope, id: i64) -> Result<(), ServiceError> {
    match notification::notification_recipient(conn, id)? {
        Some(recipient) if recipient == scope.user_id() => {
            notification::mark_read(conn, id)?;
            Ok(())
        }
        _ => Err(ServiceError::not_found("notification", id)),
    }
}
