//! API error types for handler operations
//!
//! Every failure leaves the service as `{"error": ...}` with a status derived
//! from [`ApiErrorKind`]. Validation failures carry a field → message map;
//! everything else carries a fixed or descriptive message. Storage failures
//! are logged with their cause and reported to clients only generically.
//!
//! # Example
//!
//! ```rust
//! use todo_api::handlers::{ApiError, ApiErrorKind};
//! use todo_api::repository::RepositoryError;
//!
//! let error = ApiError::from(RepositoryError::edit_conflict("todo", 3));
//! assert_eq!(error.kind, ApiErrorKind::EditConflict);
//! assert_eq!(error.kind.status_code().as_u16(), 409);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::repository::{RepositoryError, RepositoryErrorKind};

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    NotFound,
    EditConflict,
    ValidationFailed,
    BadRequest,
    MethodNotAllowed,
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::EditConflict => write!(f, "edit_conflict"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EditConflict => StatusCode::CONFLICT,
            Self::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Payload under the `error` key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(BTreeMap<String, String>),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// HTTP-facing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub detail: ErrorDetail,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            detail: ErrorDetail::Message(message.into()),
        }
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::new(ApiErrorKind::NotFound, NOT_FOUND_MESSAGE)
    }

    #[must_use]
    pub fn edit_conflict() -> Self {
        Self::new(ApiErrorKind::EditConflict, EDIT_CONFLICT_MESSAGE)
    }

    /// Field-level validation failures
    #[must_use]
    pub fn failed_validation(errors: BTreeMap<String, String>) -> Self {
        Self {
            kind: ApiErrorKind::ValidationFailed,
            detail: ErrorDetail::Fields(errors),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest, message)
    }

    #[must_use]
    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            ApiErrorKind::MethodNotAllowed,
            format!("the {method} method is not supported for this resource"),
        )
    }

    /// Log `cause` and return the generic server error
    pub fn internal(cause: impl fmt::Display) -> Self {
        tracing::error!(error = %cause, "request failed");
        Self::new(ApiErrorKind::InternalError, SERVER_ERROR_MESSAGE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            ErrorDetail::Message(message) => write!(f, "API {} error: {}", self.kind, message),
            ErrorDetail::Fields(fields) => {
                write!(f, "API {} error on", self.kind)?;
                for field in fields.keys() {
                    write!(f, " {field}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        if status.is_client_error() {
            tracing::debug!(kind = %self.kind, status = status.as_u16(), "client error");
        }
        (status, Json(ErrorBody { error: self.detail })).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Self::not_found(),
            RepositoryErrorKind::EditConflict => Self::edit_conflict(),
            RepositoryErrorKind::InvalidSort => Self::failed_validation(BTreeMap::from([(
                "sort".to_string(),
                "invalid sort value".to_string(),
            )])),
            RepositoryErrorKind::ConnectionFailed
            | RepositoryErrorKind::Timeout
            | RepositoryErrorKind::DatabaseError => Self::internal(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
