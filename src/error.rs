/// Unified error types for Study Gate
use crate::account::DenialReason;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum GateError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing or malformed request fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Registration hit the unique email constraint
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// Mutation target does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Student login refused by the access gate
    #[error("{}", .0.message())]
    LoginDenied(DenialReason),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization errors
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Admin grant token errors
    #[error("Token error: {0}")]
    Token(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Convert GateError to HTTP response
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            GateError::InvalidInput(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidInput",
                self.to_string(),
            ),
            GateError::DuplicateEmail(_) => (
                StatusCode::CONFLICT,
                "DuplicateEmail",
                self.to_string(),
            ),
            GateError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            GateError::LoginDenied(reason) => {
                let status = match reason {
                    DenialReason::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::FORBIDDEN,
                };
                (status, reason.code(), reason.message().to_string())
            }
            GateError::Authentication(_) | GateError::Token(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            GateError::Authorization(_) => {
                (StatusCode::FORBIDDEN, "Forbidden", self.to_string())
            }
            GateError::RateLimitExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "RateLimitExceeded",
                "Rate limit exceeded".to_string(),
            ),
            GateError::Database(_) | GateError::Internal(_) | GateError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type GateResult<T> = Result<T, GateError>;
