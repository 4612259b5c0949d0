//! Shared types for the HTTP layer.

use crate::auth::SessionClaims;

/// Authenticated caller, injected into request extensions by the auth
/// middleware after token validation.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub SessionClaims);
