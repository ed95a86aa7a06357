//! # Database Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OpError ← DbError or a domain LedgerError, whichever applies          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller renders an error dialog from the structured kind               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating ledger operation runs inside one transaction: returning
//! any of these errors before commit drops the transaction and rolls the
//! whole operation back.

use thiserror::Error;

use shopstock_core::{LedgerError, ValidationError};

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
///
/// These wrap sqlx errors and provide additional context for debugging
/// and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate shop name (case-insensitive index)
    /// - Duplicate product name (concurrent find-or-create)
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// Also covers CHECK constraint failures, e.g. a write that would
    /// drive a stock quantity negative past the compare-and-swap guard.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for read-only database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// OpError
// =============================================================================

/// Error type returned by mutating ledger operations.
///
/// Splits failures into the recoverable domain taxonomy (validation,
/// duplicates, blocked deletes, insufficient stock) and storage-level
/// failures. Either way the operation was applied atomically or not
/// at all.
#[derive(Debug, Error)]
pub enum OpError {
    #[error(transparent)]
    Domain(#[from] LedgerError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for OpError {
    fn from(err: ValidationError) -> Self {
        OpError::Domain(LedgerError::Validation(err))
    }
}

impl From<sqlx::Error> for OpError {
    fn from(err: sqlx::Error) -> Self {
        OpError::Db(err.into())
    }
}

impl OpError {
    /// Re-maps a unique-index violation to the domain `DuplicateName`
    /// error for the given entity, leaving other errors untouched.
    ///
    /// Used by shop create/rename and product find-or-create/rename,
    /// where the case-insensitive unique index is the authority on
    /// name collisions.
    pub(crate) fn name_collision(self, entity: &'static str, name: &str) -> OpError {
        match self {
            OpError::Db(DbError::UniqueViolation { .. }) => {
                OpError::Domain(LedgerError::DuplicateName {
                    entity,
                    name: name.to_string(),
                })
            }
            other => other,
        }
    }
}

/// Result type for mutating ledger operations.
pub type OpResult<T> = Result<T, OpError>;

// =============================================================================
// Unit Tests
// =============================================================================
