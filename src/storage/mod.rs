//! SQLite storage layer for sqlite-crud.
//!
//! Provides:
//! - Per-call connection setup with a busy timeout
//! - Idempotent schema creation
//! - The [`UserRepository`] CRUD operations
//!
//! Connections are never pooled. Each operation opens one, runs a single
//! autocommitted statement and drops it, so the file handle is released on
//! every exit path.

pub mod schema;
pub mod users;

pub use users::{User, UserRepository};

use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database file cannot be opened, created, locked or written.
    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    /// A statement violated a table constraint.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    /// Malformed SQL or any other failure while executing a statement.
    #[error("Statement error: {0}")]
    Statement(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly
                | ErrorCode::DiskFull
                | ErrorCode::SystemIoFailure
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::FileLockingProtocolFailed
                | ErrorCode::NoLargeFileSupport,
            ) => Self::Unavailable(err),
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(err),
            _ => Self::Statement(err),
        }
    }
}

/// Open a read-write connection to `path`, creating the file if needed.
pub(crate) fn open_connection(
    path: &Path,
    busy_timeout: Duration,
) -> Result<Connection, StorageError> {
    let conn = Connection::open(path).map_err(StorageError::Unavailable)?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}
