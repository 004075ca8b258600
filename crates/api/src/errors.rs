//! Consistent JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use meshguard_auth::AuthzError;
use meshguard_core::AccessError;

/// Access failure on its way out as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(pub AccessError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AccessError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccessError::BadInput(_) => StatusCode::BAD_REQUEST,
            AccessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        Self(value)
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.0 {
            AccessError::Unauthenticated(msg) => json_error(status, "Unauthorized", msg),
            AccessError::Forbidden(msg) => {
                tracing::warn!("access denied: {msg}");
                json_error(status, "Forbidden", msg)
            }
            AccessError::BadInput(msg) => {
                tracing::warn!("bad request: {msg}");
                json_error(status, "Bad Request", msg)
            }
            AccessError::Internal(msg) => {
                tracing::error!("unexpected error: {msg}");
                json_error(status, "Internal Server Error", "An unexpected error occurred")
            }
        }
    }
}

pub fn json_error(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": error,
            "message": message.into(),
        })),
    )
        .into_response()
}
