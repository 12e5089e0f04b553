// HTTP error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for HTTP handlers
pub type AppResult<T> = Result<T, AppError>;

/// Application error with HTTP status code and a stable machine code
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_argument", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {}

/// Error response JSON structure
#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    code: String,
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Convert connect_core errors to HTTP errors
impl From<connect_core::Error> for AppError {
    fn from(err: connect_core::Error) -> Self {
        use connect_core::Error;

        let code = err.code();
        match err {
            Error::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, code, msg),
            Error::Unauthorized(msg) => Self::new(StatusCode::UNAUTHORIZED, code, msg),
            Error::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, code, msg),
            Error::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, code, msg),
            Error::Gone(msg) => Self::new(StatusCode::GONE, code, msg),
            Error::Locked(msg) => Self::new(StatusCode::LOCKED, code, msg),
            Error::Conflict(msg) => Self::new(StatusCode::CONFLICT, code, msg),
            Error::ResourceExhausted(msg) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, code, msg)
            }
            Error::Database(e) => {
                tracing::error!("Database error: {e}");
                Self::internal("Database error")
            }
            Error::Serialization(e) => {
                tracing::error!("Serialization error: {e}");
                Self::internal("Data processing error")
            }
            Error::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                Self::internal("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_core::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::InvalidArgument(String::new()), StatusCode::BAD_REQUEST),
            (Error::Unauthorized(String::new()), StatusCode::UNAUTHORIZED),
            (Error::Forbidden(String::new()), StatusCode::FORBIDDEN),
            (Error::NotFound(String::new()), StatusCode::NOT_FOUND),
            (Error::Gone(String::new()), StatusCode::GONE),
            (Error::Locked(String::new()), StatusCode::LOCKED),
            (Error::Conflict(String::new()), StatusCode::CONFLICT),
            (
                Error::ResourceExhausted(String::new()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::from(Error::Internal("connection string leaked".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("leaked"));
    }
}
