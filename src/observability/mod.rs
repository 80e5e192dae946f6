//! OpenTelemetry observability infrastructure.
//!
//! Provides:
//! - Structured logging with an environment filter
//! - Optional OTLP span export, owned by an explicit [`Telemetry`] value
//! - [`TracedRunner`] for wrapping work in nested spans

pub mod runner;
pub mod tracing;

pub use self::runner::TracedRunner;
pub use self::tracing::{LogFormat, Telemetry, TelemetryConfig, TelemetryError};
