use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only event log entry keyed by recipient. Only `is_read` is ever
/// mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
