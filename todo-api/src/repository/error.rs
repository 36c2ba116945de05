//! Repository error types
//!
//! Structured errors for model operations. Domain outcomes (not found, edit
//! conflict) are distinct kinds so callers can react to them, while every
//! backend failure collapses into a storage kind whose message is only ever
//! logged.
//!
//! # Example
//!
//! ```rust
//! use todo_api::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::edit_conflict("todo", 7);
//! assert!(matches!(error.kind, RepositoryErrorKind::EditConflict));
//! assert_eq!(error.entity_id, Some("7".to_string()));
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Writing a new row
    Insert,
    /// Reading a single row by id
    Get,
    /// Conditional write of an existing row
    Update,
    /// Removing a row by id
    Delete,
    /// Filtered, paginated listing
    GetAll,
    /// Establishing or verifying connectivity
    Connect,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Get => write!(f, "get"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::GetAll => write!(f, "get_all"),
            Self::Connect => write!(f, "connect"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// No row with the requested id
    NotFound,
    /// Conditional update matched no row (stale version or row gone)
    EditConflict,
    /// Sort key outside the resource's allow-list
    InvalidSort,
    /// Failed to reach the database
    ConnectionFailed,
    /// Operation exceeded its deadline
    Timeout,
    /// Any other backend failure
    DatabaseError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::EditConflict => write!(f, "edit_conflict"),
            Self::InvalidSort => write!(f, "invalid_sort"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The kind of entity involved (e.g. "todo")
    pub entity_type: Option<String>,
    /// The id of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// No row exists for `entity_id`
    ///
    /// ```rust
    /// use todo_api::repository::RepositoryError;
    ///
    /// let error = RepositoryError::not_found("organization", 999_999);
    /// assert_eq!(error.entity_type, Some("organization".to_string()));
    /// ```
    pub fn not_found(entity_type: impl Into<String>, entity_id: i64) -> Self {
        Self::new(
            RepositoryOperation::Get,
            RepositoryErrorKind::NotFound,
            "record not found",
        )
        .with_entity(entity_type, entity_id.to_string())
    }

    /// The conditional update for `entity_id` matched no row
    pub fn edit_conflict(entity_type: impl Into<String>, entity_id: i64) -> Self {
        Self::new(
            RepositoryOperation::Update,
            RepositoryErrorKind::EditConflict,
            "edit conflict",
        )
        .with_entity(entity_type, entity_id.to_string())
    }

    /// `sort` is not in the allow-list; no query was issued
    pub fn invalid_sort(sort: &str) -> Self {
        Self::new(
            RepositoryOperation::GetAll,
            RepositoryErrorKind::InvalidSort,
            format!("unsafe sort parameter: {sort}"),
        )
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Connect,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Create a timeout error
    ///
    /// ```rust
    /// use todo_api::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::timeout(RepositoryOperation::GetAll, "query exceeded 3s");
    /// assert!(error.is_retriable());
    /// ```
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Create a database error
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Classify a driver error raised during `operation`
    pub fn from_sqlx(operation: RepositoryOperation, err: sqlx::Error) -> Self {
        use sqlx::Error as E;
        match err {
            E::PoolTimedOut => Self::timeout(operation, "timed out acquiring a pooled connection"),
            E::PoolClosed => {
                Self::connection_failed("connection pool is closed").with_operation(operation)
            }
            E::Io(e) => Self::connection_failed(e.to_string()).with_operation(operation),
            E::Tls(e) => {
                Self::connection_failed(format!("TLS error: {e}")).with_operation(operation)
            }
            E::WorkerCrashed => {
                Self::connection_failed("database worker crashed").with_operation(operation)
            }
            other => Self::database_error(operation, other.to_string()),
        }
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Name the kind of entity involved without a specific id
    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Transient failures that may succeed if the caller retries
    ///
    /// Edit conflicts are deliberately excluded: retrying the same write with
    /// the same stale version can never succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }

    /// Backend failures whose details must not reach API clients
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed
                | RepositoryErrorKind::Timeout
                | RepositoryErrorKind::DatabaseError
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
