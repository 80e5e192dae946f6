//! Configuration parsing for sqlite-crud.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Defaults matching the original demo (`mydb.sqlite`, `sqlite3-crud`)

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::observability::tracing::{LogFormat, TelemetryConfig};

/// Default filter: informational lines everywhere, debug for this crate.
pub const DEFAULT_LOG_FILTER: &str = "info,sqlite_crud=debug";

/// How fetched rows are written to stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `(id, "name", "email")` tuple per line
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// sqlite-crud: traced CRUD demo against a local SQLite users table.
#[derive(Parser, Debug, Clone)]
#[command(name = "sqlite-crud")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the SQLite database file
    #[arg(long, env = "CRUD_DB_PATH", default_value = "mydb.sqlite")]
    pub db_path: PathBuf,

    /// How long a statement waits on a locked database file, in milliseconds
    #[arg(long, env = "CRUD_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Log filter directives (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_level: String,

    /// Log line format
    #[arg(long, env = "CRUD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Format of the rows printed to stdout
    #[arg(long, env = "CRUD_OUTPUT", value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// OpenTelemetry collector endpoint for span export (optional)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    /// Service name reported to the collector
    #[arg(long, env = "OTEL_SERVICE_NAME", default_value = "sqlite3-crud")]
    pub service_name: String,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Busy timeout as a [`Duration`].
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Telemetry settings derived from this configuration.
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            service_name: self.service_name.clone(),
            log_filter: self.log_level.clone(),
            log_format: self.log_format,
            otel_endpoint: self.otel_endpoint.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("mydb.sqlite"),
            busy_timeout_ms: 5000,
            log_level: DEFAULT_LOG_FILTER.into(),
            log_format: LogFormat::Text,
            output: OutputFormat::Text,
            otel_endpoint: None,
            service_name: "sqlite3-crud".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("mydb.sqlite"));
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(config.otel_endpoint.is_none());
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::try_parse_from([
            "sqlite-crud",
            "--db-path",
            "/tmp/other.sqlite",
            "--output",
            "json",
            "--otel-endpoint",
            "http://localhost:4317",
        ])
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/other.sqlite"));
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(
            config.telemetry().otel_endpoint.as_deref(),
            Some("http://localhost:4317")
        );
    }
}
