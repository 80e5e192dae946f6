//! The demonstration sequence run by the binary.
//!
//! ensure schema → insert → fetch and print → update → delete, with each
//! step's span nested inside the previous one (schema creation stands alone).

use std::io::{self, Write};
use thiserror::Error;

use crate::config::OutputFormat;
use crate::observability::TracedRunner;
use crate::storage::{StorageError, User, UserRepository};

/// Span names, in the order they are opened.
pub const TABLE_CREATION: &str = "table creation";
pub const USER_INSERTION: &str = "user insertion";
pub const USER_READ: &str = "user read";
pub const USER_UPDATE: &str = "user update";
pub const USER_DELETION: &str = "user deletion";

const INSERTED_NAME: &str = "Alice";
const INSERTED_EMAIL: &str = "alice@example.com";
const UPDATED_NAME: &str = "Bob";
const UPDATED_EMAIL: &str = "bob@example.com";

/// Error type for the demonstration sequence.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),

    #[error("Failed to encode user: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What the sequence did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Id assigned to the inserted user
    pub inserted_id: i64,
    /// Rows read (and printed) after the insert
    pub fetched: Vec<User>,
    /// Rows changed by the update
    pub updated: usize,
    /// Rows removed by the delete
    pub deleted: usize,
}

/// Run the sequence, printing the fetched rows to `out`.
///
/// The first error stops the sequence and is returned as is. Steps already
/// committed stay committed.
pub fn run_scenario<W: Write>(
    repo: &UserRepository,
    runner: &TracedRunner,
    format: OutputFormat,
    out: &mut W,
) -> Result<ScenarioOutcome, ScenarioError> {
    runner.run_traced(TABLE_CREATION, || repo.ensure_schema())?;

    runner.run_traced(USER_INSERTION, || -> Result<_, ScenarioError> {
        let inserted_id = repo.insert(INSERTED_NAME, INSERTED_EMAIL)?;

        runner.run_traced(USER_READ, || -> Result<_, ScenarioError> {
            let fetched = repo.fetch_all()?;
            print_users(&fetched, format, out)?;

            runner.run_traced(USER_UPDATE, || -> Result<_, ScenarioError> {
                let updated = repo.update_by_id(inserted_id, UPDATED_NAME, UPDATED_EMAIL)?;

                runner.run_traced(USER_DELETION, || -> Result<_, ScenarioError> {
                    let deleted = repo.delete_by_id(inserted_id)?;
                    Ok(ScenarioOutcome {
                        inserted_id,
                        fetched,
                        updated,
                        deleted,
                    })
                })
            })
        })
    })
}

/// Write `users` to `out` in the requested format.
pub fn print_users<W: Write>(
    users: &[User],
    format: OutputFormat,
    out: &mut W,
) -> Result<(), ScenarioError> {
    match format {
        OutputFormat::Text => {
            writeln!(out, "Users in database:")?;
            for user in users {
                writeln!(out, "{user}")?;
            }
        }
        OutputFormat::Json => {
            for user in users {
                serde_json::to_writer(&mut *out, user)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}
