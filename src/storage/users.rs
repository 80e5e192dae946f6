//! CRUD operations on the `users` table.

use rusqlite::params;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::schema::initialize_schema;
use super::{open_connection, StorageError};

/// Default time a statement waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// A row of the `users` table.
///
/// The columns carry no NOT NULL constraint, so another writer may leave
/// `name` or `email` unset; those read back as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Assigned by SQLite on insert, never changed afterwards.
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl User {
    /// A user with both columns set.
    pub fn new(id: i64, name: &str, email: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            email: Some(email.to_string()),
        }
    }
}

/// Quoted text, or `None` for NULL.
struct Column<'a>(&'a Option<String>);

impl fmt::Display for Column<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value:?}"),
            None => f.write_str("None"),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.id,
            Column(&self.name),
            Column(&self.email)
        )
    }
}

/// Repository over a single SQLite database file.
///
/// Holds only the path; every call opens its own connection and runs one
/// statement in autocommit mode.
#[derive(Debug, Clone)]
pub struct UserRepository {
    path: PathBuf,
    busy_timeout: Duration,
}

impl UserRepository {
    /// Create a repository for the database at `path`.
    ///
    /// Nothing is opened until the first operation.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Set how long statements wait on a locked database file.
    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the `users` table if it is absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        tracing::info!("Creating users table");
        let conn = open_connection(&self.path, self.busy_timeout)?;
        tracing::debug!(path = %self.path.display(), "Creating table 'users'");
        initialize_schema(&conn)?;
        tracing::debug!("Table 'users' created");
        Ok(())
    }

    /// Insert a user and return the id SQLite assigned to it.
    pub fn insert(&self, name: &str, email: &str) -> Result<i64, StorageError> {
        tracing::info!("Inserting user");
        let conn = open_connection(&self.path, self.busy_timeout)?;
        tracing::debug!(name, "Inserting user row");
        conn.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(user_id = id, name, "User inserted");
        Ok(id)
    }

    /// Fetch every user, ordered by id. NULL columns come back as `None`.
    pub fn fetch_all(&self) -> Result<Vec<User>, StorageError> {
        tracing::info!("Fetching users");
        let conn = open_connection(&self.path, self.busy_timeout)?;
        tracing::debug!("Fetching all users");
        let mut stmt = conn.prepare("SELECT id, name, email FROM users ORDER BY id ASC")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = users.len(), "Users fetched");
        Ok(users)
    }

    /// Overwrite name and email of the user with `id`.
    ///
    /// Returns the number of rows changed; a missing id yields 0, not an error.
    pub fn update_by_id(&self, id: i64, name: &str, email: &str) -> Result<usize, StorageError> {
        tracing::info!("Updating user");
        let conn = open_connection(&self.path, self.busy_timeout)?;
        tracing::debug!(user_id = id, "Updating user row");
        let affected = conn.execute(
            "UPDATE users SET name = ?1, email = ?2 WHERE id = ?3",
            params![name, email, id],
        )?;
        tracing::debug!(user_id = id, affected, "User updated");
        Ok(affected)
    }

    /// Delete the user with `id`.
    ///
    /// Returns the number of rows removed; a missing id yields 0, not an error.
    pub fn delete_by_id(&self, id: i64) -> Result<usize, StorageError> {
        tracing::info!("Deleting user");
        let conn = open_connection(&self.path, self.busy_timeout)?;
        tracing::debug!(user_id = id, "Deleting user row");
        let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        tracing::debug!(user_id = id, affected, "User deleted");
        Ok(affected)
    }
}
