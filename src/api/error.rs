//! HTTP error mapping with structured JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ServiceError;

/// Error response body: `{"error": {"code", "message"}}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Service(err) => match err {
                ServiceError::DuplicateIdentity => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_IDENTITY",
                    err.to_string(),
                ),
                ServiceError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    err.to_string(),
                ),
                ServiceError::InvalidSession => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_SESSION",
                    err.to_string(),
                ),
                ServiceError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                ServiceError::Forbidden => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
                }
                ServiceError::Validation(detail) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
                }
                ServiceError::Database(db_err) => {
                    tracing::error!(error = %db_err, "database failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ApiError::Service(ServiceError::Database(err))
    }
}
