//! Unified error handling
//!
//! Application-level error type over the shared wire taxonomy:
//! - [`AppError`] - internal failure enum, maps to [`ApiErrorCode`]
//! - [`AppResponse`] - the `{success, message, data}` envelope
//!
//! Every failure turns into a structured `{success: false, message}`
//! body; HTTP status codes come from the shared status table so the
//! mapping lives in one place.

use axum::{
    Json,
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use shared::ApiErrorCode;

pub use shared::ApiResponse as AppResponse;

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (4xx) ==========
    #[error("Authentication required")]
    /// Not logged in (401)
    Unauthorized,

    #[error("Token expired")]
    /// Expired token (401)
    TokenExpired,

    #[error("Invalid token")]
    /// Malformed or forged token (401)
    InvalidToken,

    #[error("Permission denied: {0}")]
    /// Missing role (403)
    Forbidden(String),

    // ========== Business logic errors (4xx) ==========
    #[error("Resource not found: {0}")]
    /// No matching record (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// Duplicate SKU / slug / sibling name (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// Missing or malformed required field (400)
    Validation(String),

    #[error("Invalid transition: {0}")]
    /// Undefined order state machine edge (422)
    InvalidTransition(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    /// Data-store failure (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// Anything else (500)
    Internal(String),

    #[error("Invalid request: {0}")]
    /// Bad request shape (400)
    Invalid(String),
}

impl AppError {
    /// Wire-level code for this error
    pub fn error_code(&self) -> ApiErrorCode {
        match self {
            AppError::Unauthorized => ApiErrorCode::Unauthorized,
            AppError::TokenExpired => ApiErrorCode::TokenExpired,
            AppError::InvalidToken => ApiErrorCode::InvalidToken,
            AppError::Forbidden(_) => ApiErrorCode::Forbidden,
            AppError::NotFound(_) => ApiErrorCode::NotFound,
            AppError::Conflict(_) => ApiErrorCode::Conflict,
            AppError::Validation(_) => ApiErrorCode::Validation,
            AppError::InvalidTransition(_) => ApiErrorCode::InvalidTransition,
            AppError::Database(_) => ApiErrorCode::Database,
            AppError::Internal(_) => ApiErrorCode::Internal,
            AppError::Invalid(_) => ApiErrorCode::Invalid,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        // 5xx detail goes to the log, not the client
        let message = match &self {
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg)
            | AppError::InvalidTransition(msg)
            | AppError::Invalid(msg) => msg.clone(),
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                code.default_message().to_string()
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                code.default_message().to_string()
            }
            _ => code.default_message().to_string(),
        };

        let body = Json(AppResponse::<()>::error(message));
        (code.status_code(), body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Validation(format!("Multipart error: {}", e))
    }
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(e: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

// ========== Helper Constructors ==========

impl AppError {
    /// Unified message to prevent username enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::Invalid("Invalid username or password".to_string())
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse::ok(data))
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse::ok_with_message(data, message))
}

/// Result type for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::http::StatusCode;

    #[test]
    fn test_error_codes_map_to_expected_status() {
        assert_eq!(
            AppError::NotFound("x".into()).error_code().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).error_code().status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidTransition("x".into())
                .error_code()
                .status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_repo_error_conversion() {
        use crate::db::repository::RepoError;
        let err: AppError = RepoError::Duplicate("SKU TEE".into()).into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
