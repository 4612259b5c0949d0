//! In-memory session store for bearer tokens.
//!
//! Tokens are opaque (32 random bytes, URL-safe base64) and stored
//! server-side as SHA-256 hashes with a fixed lifetime. Validation is the
//! single entry point: hash the presented token, look it up, check expiry.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;

use crate::config::SESSION_LIFETIME_SECS;
use crate::error::ServiceError;
use crate::models::enums::Role;

/// Identity and role claims carried by a valid session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: i64,
    pub role: Role,
}

struct SessionEntry {
    claims: SessionClaims,
    expires_at: Instant,
}

pub struct SessionStore {
    entries: HashMap<[u8; 32], SessionEntry>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_lifetime(Duration::from_secs(SESSION_LIFETIME_SECS))
    }

    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lifetime,
        }
    }

    /// Issue a fresh token for the given identity. Returns the plaintext
    /// token; only its hash is retained.
    pub fn issue(&mut self, user_id: i64, role: Role) -> String {
        self.prune();
        let token = generate_token();
        self.entries.insert(
            hash_token(&token),
            SessionEntry {
                claims: SessionClaims { user_id, role },
                expires_at: Instant::now() + self.lifetime,
            },
        );
        token
    }

    /// Decode-and-validate: the only verification entry point.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, ServiceError> {
        let entry = self
            .entries
            .get(&hash_token(token))
            .ok_or(ServiceError::InvalidSession)?;
        if Instant::now() >= entry.expires_at {
            return Err(ServiceError::InvalidSession);
        }
        Ok(entry.claims)
    }

    fn prune(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, e| now < e.expires_at);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_validate() {
        let mut store = SessionStore::new();
        let token = store.issue(7, Role::Therapist);
        let claims = store.validate(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Therapist);
    }

    #[test]
    fn unknown_token_is_invalid_session() {
        let store = SessionStore::new();
        assert!(matches!(
            store.validate("not-a-token"),
            Err(ServiceError::InvalidSession)
        ));
    }

    #[test]
    fn expired_token_is_invalid_session() {
        let mut store = SessionStore::with_lifetime(Duration::from_secs(0));
        let token = store.issue(1, Role::Patient);
        assert!(matches!(
            store.validate(&token),
            Err(ServiceError::InvalidSession)
        ));
    }

    #[test]
    fn tokens_are_unique() {
        let mut store = SessionStore::new();
        let a = store.issue(1, Role::Admin);
        let b = store.issue(1, Role::Admin);
        assert_ne!(a, b);
    }

    #[test]
    fn expired_entries_pruned_on_issue() {
        let mut store = SessionStore::with_lifetime(Duration::from_secs(0));
        let _ = store.issue(1, Role::Patient);
        let _ = store.issue(2, Role::Patient);
        // Both entries have already expired; the second issue pruned the first.
        assert!(store.entries.len() <= 1);
    }

    #[test]
    fn hash_token_is_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }
}
