use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Gone: {0}")]
    Gone(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for API clients.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Gone(_) => "gone",
            Self::Locked(_) => "locked",
            Self::Conflict(_) => "conflict",
            Self::ResourceExhausted(_) => "resource_exhausted",
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_) => "internal",
        }
    }

    /// True when the signal relay may treat this as retryable by the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::ResourceExhausted(_))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound
            sqlx::Error::RowNotFound => Self::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                match code.as_ref() {
                    // PostgreSQL unique_violation: the only unique keys in
                    // this schema are identifiers, so a collision is a race
                    // the caller lost, not a validation failure
                    "23505" => Self::Conflict("Resource already exists".to_string()),
                    // PostgreSQL foreign_key_violation
                    "23503" => Self::NotFound("Referenced resource not found".to_string()),
                    // PostgreSQL check_violation
                    "23514" => Self::InvalidArgument("Constraint check failed".to_string()),
                    // PostgreSQL not_null_violation
                    "23502" => Self::InvalidArgument("Required field is missing".to_string()),
                    _ => Self::Database(err),
                }
            }
            _ => Self::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::InvalidArgument(String::new()).code(), "invalid_argument");
        assert_eq!(Error::Unauthorized(String::new()).code(), "unauthorized");
        assert_eq!(Error::Forbidden(String::new()).code(), "forbidden");
        assert_eq!(Error::NotFound(String::new()).code(), "not_found");
        assert_eq!(Error::Gone(String::new()).code(), "gone");
        assert_eq!(Error::Locked(String::new()).code(), "locked");
        assert_eq!(Error::Conflict(String::new()).code(), "conflict");
        assert_eq!(Error::ResourceExhausted(String::new()).code(), "resource_exhausted");
        assert_eq!(Error::Internal(String::new()).code(), "internal");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(Error::Conflict(String::new()).is_retryable());
        assert!(Error::ResourceExhausted(String::new()).is_retryable());
        assert!(!Error::Gone(String::new()).is_retryable());
    }
}
