//! Startup and process-level errors
//!
//! Request handling never produces these; see [`crate::handlers::ApiError`]
//! and [`crate::repository::RepositoryError`] for the request path.

use thiserror::Error;

use crate::repository::{RepositoryError, RepositoryOperation};

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the service from starting or serving
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration loaded but is not usable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage could not be reached or verified
    #[error("{0}")]
    Database(RepositoryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        Error::Database(err)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(RepositoryError::from_sqlx(RepositoryOperation::Connect, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;

    #[test]
    fn test_figment_error_is_boxed() {
        let err: Error = figment::Error::from("missing field `url`".to_string()).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_sqlx_error_is_a_connect_failure() {
        let err: Error = sqlx::Error::PoolClosed.into();
        match err {
            Error::Database(inner) => {
                assert_eq!(inner.operation, RepositoryOperation::Connect);
                assert_eq!(inner.kind, RepositoryErrorKind::ConnectionFailed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_config_display() {
        let err = Error::InvalidConfig("service.port must not be 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: service.port must not be 0"
        );
    }
}
