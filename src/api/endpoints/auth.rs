//! Signup and login. The only unprotected routes.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, NewAccount};
use crate::api::error::ApiError;
use crate::models::enums::Role;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SignupResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<NewAccount>,
) -> Result<Json<SignupResponse>, ApiError> {
    let mut conn = state.db.conn()?;
    let user_id = accounts::create_account(&mut conn, &body)?;
    Ok(Json(SignupResponse { user_id }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let conn = state.db.conn()?;
    let mut sessions = state
        .sessions
        .lock()
        .map_err(|_| ApiError::Internal("session lock".into()))?;
    let (token, user) = accounts::authenticate(&conn, &mut sessions, &body.email, &body.password)?;
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}
