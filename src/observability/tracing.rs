//! OpenTelemetry tracing setup.
//!
//! Configures structured logging with:
//! - An `EnvFilter` built from the configured directives
//! - Text or JSON log lines on stderr (stdout carries the printed rows)
//! - An optional OTLP exporter for the spans opened by the runner
//!
//! Nothing here touches the process-global subscriber. The caller decides
//! where the [`Dispatch`] is installed.

use clap::ValueEnum;
use opentelemetry::trace::{TraceError, TracerProvider as _};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{Config as TraceConfig, TracerProvider};
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use super::runner::TracedRunner;

/// Instrumentation scope name reported with every span.
const TRACER_NAME: &str = "sqlite-crud";

/// Log line format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with target, file and line
    #[default]
    Text,
    /// One JSON object per line, including the span list
    Json,
}

/// Settings for [`Telemetry::init`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    pub service_name: String,
    /// Filter directives, e.g. `info,sqlite_crud=debug`
    pub log_filter: String,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint. Spans are not exported when unset.
    pub otel_endpoint: Option<String>,
}

/// Error type for telemetry setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Failed to create span exporter: {0}")]
    Exporter(#[from] TraceError),
}

/// Explicitly constructed tracing context.
///
/// Owns the subscriber (as a [`Dispatch`]) and, when an endpoint is
/// configured, the tracer provider that exports spans. Call
/// [`Telemetry::shutdown`] before exit to flush pending spans.
pub struct Telemetry {
    dispatch: Dispatch,
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Build the subscriber and, if configured, the OTLP exporter.
    ///
    /// With an endpoint this must be called from within a tokio runtime, the
    /// batch span processor runs on it.
    pub fn init(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let filter = EnvFilter::try_new(&config.log_filter)?;

        let provider = config
            .otel_endpoint
            .as_deref()
            .map(|endpoint| build_provider(endpoint, &config.service_name))
            .transpose()?;

        let otel_layer = provider
            .as_ref()
            .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME)));

        let json = config.log_format == LogFormat::Json;
        let text_layer = (!json).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
        });
        let json_layer = json.then(|| {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(text_layer)
            .with(json_layer)
            .with(otel_layer);
        let dispatch = Dispatch::new(subscriber);

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::info!(
                service = %config.service_name,
                endpoint = config.otel_endpoint.as_deref().unwrap_or("none"),
                "Tracing initialized"
            );
        });

        Ok(Self { dispatch, provider })
    }

    /// The subscriber all spans and log lines of this context go to.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// A runner that opens its spans in this context.
    pub fn runner(&self) -> TracedRunner {
        TracedRunner::new(self.dispatch.clone())
    }

    /// Whether spans are exported to a collector.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush pending spans to the collector.
    ///
    /// Export failures are logged and otherwise ignored. The span processor
    /// itself shuts down once, when the last handle to the tracer (held by
    /// the dispatch) is dropped.
    pub fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };

        tracing::dispatcher::with_default(&self.dispatch, || {
            let failures = provider
                .force_flush()
                .into_iter()
                .filter_map(Result::err)
                .inspect(|e| tracing::warn!(error = %e, "Failed to flush spans to collector"))
                .count();
            if failures == 0 {
                tracing::debug!("Spans flushed");
            }
        });
    }
}

/// Create a tracer provider exporting over OTLP/gRPC in batches.
fn build_provider(endpoint: &str, service_name: &str) -> Result<TracerProvider, TraceError> {
    use opentelemetry_otlp::WithExportConfig;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let resource = Resource::new(vec![KeyValue::new(
        "service.name",
        service_name.to_string(),
    )]);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(TraceConfig::default().with_resource(resource))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}
