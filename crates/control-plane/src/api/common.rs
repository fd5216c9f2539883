// Common DTOs for the public API
//
// Every error body is `{"error": "..."}` with the status carried alongside.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::AuthError;
use serde::Serialize;

/// Error response for API endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotFound(_) => ApiError::not_found(),
            AuthError::AlreadyExists(_) | AuthError::Malformed(_) => {
                ApiError::bad_request(err.to_string())
            }
            AuthError::InvalidToken => ApiError::forbidden(),
            AuthError::StoreUnavailable(_) => {
                tracing::error!(error = %err, "Store unavailable");
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
            }
            AuthError::Hashing(_) | AuthError::Configuration(_) => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("Internal server error")
            }
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::not_found()
}
