//! Traced execution of units of work.

use tracing::Dispatch;

/// Wraps work in named spans of one telemetry context.
///
/// Spans nest following the call stack: a span opened while another runner
/// span is active becomes its child.
#[derive(Debug, Clone)]
pub struct TracedRunner {
    dispatch: Dispatch,
}

impl TracedRunner {
    /// Create a runner reporting to `dispatch`.
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Run `work` inside a span named `span_name`.
    ///
    /// The span is a child of the current span and ends when `work` returns
    /// or unwinds. Errors are returned unchanged.
    pub fn run_traced<T>(&self, span_name: &str, work: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, || {
            // `otel.name` becomes the exported span name.
            let span = tracing::info_span!("operation", otel.name = span_name);
            let _entered = span.enter();

            tracing::info!(operation = span_name, "Operation started");
            let output = work();
            tracing::info!(operation = span_name, "Operation finished");
            output
        })
    }
}
