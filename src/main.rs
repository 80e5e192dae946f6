//! sqlite-crud: runs the traced CRUD demonstration against a SQLite file.
//!
//! # Usage
//!
//! ```bash
//! sqlite-crud --db-path ./mydb.sqlite --otel-endpoint http://localhost:4317
//! ```
//!
//! Environment variables can also be used:
//! - `CRUD_DB_PATH`: Path to the SQLite database
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint for span export
//! - `RUST_LOG`: Log filter (trace, debug, info, warn, error)

use anyhow::Context;
use sqlite_crud::config::Config;
use sqlite_crud::observability::Telemetry;
use sqlite_crud::scenario::run_scenario;
use sqlite_crud::storage::UserRepository;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config, repo: &UserRepository) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  sqlite-crud v{}

  Configuration:
    Database:   {}
    Collector:  {}
    Log Level:  {}
"#,
        version,
        repo.path().display(),
        config.otel_endpoint.as_deref().unwrap_or("disabled"),
        config.log_level
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging; the OTLP batch exporter runs on this runtime
    let telemetry =
        Telemetry::init(&config.telemetry()).context("failed to initialize telemetry")?;
    let _default = tracing::dispatcher::set_default(telemetry.dispatch());

    let repo =
        UserRepository::new(config.db_path.clone()).with_busy_timeout(config.busy_timeout());
    print_banner(&config, &repo);

    let runner = telemetry.runner();

    let stdout = std::io::stdout();
    let result = run_scenario(&repo, &runner, config.output, &mut stdout.lock());

    match &result {
        Ok(outcome) => tracing::info!(
            user_id = outcome.inserted_id,
            updated = outcome.updated,
            deleted = outcome.deleted,
            "Demonstration complete"
        ),
        Err(e) => tracing::error!(error = %e, "Demonstration failed"),
    }

    // Flush spans whether or not the sequence succeeded
    telemetry.shutdown();

    result.context("demonstration sequence failed")?;
    Ok(())
}
