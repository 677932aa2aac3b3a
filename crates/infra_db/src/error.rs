//! Database error types
//!
//! This module defines the error types that can occur during database operations,
//! classifying SQLx driver failures so the domain can tell a constraint
//! rejection from a locked store or a lost connection.

use thiserror::Error;

use domain_collection::{RepositoryError, StoreErrorKind};

/// SQLite extended result codes reporting a locked store
///
/// `SQLITE_BUSY`, `SQLITE_LOCKED`, `SQLITE_BUSY_RECOVERY`, `SQLITE_BUSY_SNAPSHOT`
const BUSY_CODES: [&str; 4] = ["5", "6", "261", "517"];

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check or not-null constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Another connection holds the write lock past the busy timeout
    #[error("Database is busy: {0}")]
    Busy(String),

    /// An update or delete matched no row
    #[error("Row not found: {0}")]
    MissingRow(String),

    /// Schema bootstrap failed
    #[error("Schema bootstrap failed: {0}")]
    SchemaFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored row could not be mapped to an entity
    #[error("Invalid row data: {0}")]
    InvalidData(String),
}

impl DatabaseError {
    /// Creates a missing row error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::missing_row("Album", "ALB-123");
    /// assert!(error.to_string().contains("Album"));
    /// ```
    pub fn missing_row(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::MissingRow(format!("{} with id '{}' does not exist", entity, id))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }

    /// Returns the store rejection kind reported to the domain
    pub fn store_kind(&self) -> StoreErrorKind {
        match self {
            DatabaseError::DuplicateEntry(_) => StoreErrorKind::UniqueViolation,
            DatabaseError::ForeignKeyViolation(_) => StoreErrorKind::ForeignKeyViolation,
            DatabaseError::ConstraintViolation(_) => StoreErrorKind::CheckViolation,
            DatabaseError::Busy(_) => StoreErrorKind::Busy,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => {
                StoreErrorKind::Connection
            }
            DatabaseError::MissingRow(_) => StoreErrorKind::MissingRow,
            DatabaseError::QueryFailed(_)
            | DatabaseError::SchemaFailed(_)
            | DatabaseError::InvalidData(_) => StoreErrorKind::Other,
        }
    }
}

/// Converts SQLx errors to more specific DatabaseError variants
///
/// Constraint failures are recognised through the driver's error kind; a
/// locked store through the SQLite extended result code.
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::InvalidData(error.to_string())
            }
            sqlx::Error::Database(ref db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => {
                        DatabaseError::DuplicateEntry(message)
                    }
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        DatabaseError::ForeignKeyViolation(message)
                    }
                    sqlx::error::ErrorKind::CheckViolation
                    | sqlx::error::ErrorKind::NotNullViolation => {
                        DatabaseError::ConstraintViolation(message)
                    }
                    _ => {
                        let busy = db_err
                            .code()
                            .is_some_and(|code| BUSY_CODES.contains(&code.as_ref()));
                        if busy {
                            DatabaseError::Busy(message)
                        } else {
                            DatabaseError::QueryFailed(message)
                        }
                    }
                }
            }
            other => DatabaseError::QueryFailed(other.to_string()),
        }
    }
}

impl From<DatabaseError> for RepositoryError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::InvalidData(message) => RepositoryError::InvalidData(message),
            other => RepositoryError::Store {
                kind: other.store_kind(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
