//! sqlite-crud: traced create/read/update/delete over a local SQLite table.
//!
//! Every storage call is a single autocommitted statement on a freshly opened
//! connection. Calls are wrapped in nested tracing spans that can be exported
//! to an OpenTelemetry collector.
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`observability`]: Telemetry setup and the traced runner
//! - [`scenario`]: The demonstration sequence run by the binary
//! - [`storage`]: SQLite persistence for users

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // storage::users::UserRepository is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::needless_raw_string_hashes  // r#""# is fine for SQL
)]

pub mod config;
pub mod observability;
pub mod scenario;
pub mod storage;
