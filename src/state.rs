//! Process-wide shared state, handed to the router explicitly.

use std::sync::{Arc, Mutex};

use crate::auth::SessionStore;
use crate::db::Database;

/// Everything a request handler needs. Cloning is cheap; both fields are
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        }
    }
}
