//! Test utilities shared by the integration tests.
//!
//! Provides:
//! - Temporary database fixtures
//! - A span/event recorder for asserting trace structure

#![allow(dead_code)]

use sqlite_crud::observability::TracedRunner;
use sqlite_crud::storage::UserRepository;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, SpanRef};

/// Test fixture that manages a temporary database directory.
///
/// The directory is automatically cleaned up when the fixture is dropped.
pub struct TestFixture {
    /// Temporary directory for test database
    pub temp_dir: TempDir,
    /// Path to the database file
    pub db_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with a temporary database directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        Self { temp_dir, db_path }
    }

    /// Repository over the fixture database, schema not yet created.
    pub fn repository(&self) -> UserRepository {
        UserRepository::new(self.db_path.clone())
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A span as seen by [`SpanRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSpan {
    pub name: String,
    pub parent: Option<String>,
}

/// A log event with the span it was emitted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub level: tracing::Level,
    pub message: String,
    pub span: Option<String>,
}

#[derive(Debug, Default)]
struct Recording {
    opened: Vec<RecordedSpan>,
    closed: Vec<String>,
    events: Vec<RecordedEvent>,
}

/// Layer recording span names (`otel.name` when present), parents and events.
#[derive(Debug, Clone, Default)]
pub struct SpanRecorder {
    recording: Arc<Mutex<Recording>>,
}

struct SpanName(String);

fn span_name<'a, S: LookupSpan<'a>>(span: &SpanRef<'a, S>) -> Option<String> {
    let extensions = span.extensions();
    extensions.get::<SpanName>().map(|n| n.0.clone())
}

#[derive(Default)]
struct NameVisitor {
    otel_name: Option<String>,
    message: Option<String>,
}

impl Visit for NameVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "otel.name" {
            self.otel_name = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

impl SpanRecorder {
    /// A runner whose spans and events land in this recorder.
    pub fn runner(&self) -> TracedRunner {
        TracedRunner::new(self.dispatch())
    }

    pub fn dispatch(&self) -> Dispatch {
        Dispatch::new(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn opened(&self) -> Vec<RecordedSpan> {
        self.recording.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.recording.lock().unwrap().closed.clone()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.recording.lock().unwrap().events.clone()
    }

    /// Messages emitted while `span` was the innermost span.
    pub fn messages_in(&self, span: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.span.as_deref() == Some(span))
            .map(|e| e.message)
            .collect()
    }
}

impl<S> Layer<S> for SpanRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        let mut visitor = NameVisitor::default();
        attrs.record(&mut visitor);
        let name = visitor
            .otel_name
            .unwrap_or_else(|| attrs.metadata().name().to_string());

        let parent = span.parent().and_then(|parent| span_name(&parent));

        span.extensions_mut().insert(SpanName(name.clone()));
        self.recording
            .lock()
            .unwrap()
            .opened
            .push(RecordedSpan { name, parent });
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut visitor = NameVisitor::default();
        event.record(&mut visitor);

        let span = ctx.event_span(event).and_then(|span| span_name(&span));

        self.recording.lock().unwrap().events.push(RecordedEvent {
            level: *event.metadata().level(),
            message: visitor.message.unwrap_or_default(),
            span,
        });
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(name) = ctx.span(&id).and_then(|span| span_name(&span)) {
            self.recording.lock().unwrap().closed.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.temp_dir.path().exists());
        assert!(fixture.db_path.ends_with("test.sqlite"));
    }
}
