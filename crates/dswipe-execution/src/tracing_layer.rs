//! Tracing layer that streams swipe lifecycle events to a frontend.
//!
//! Events emitted by the orchestrator crate are captured together with the
//! fields of the `swipe_session` span they happened in and forwarded over an
//! unbounded tokio channel.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Target prefix of everything logged by the orchestrator crate.
pub const ORCHESTRATOR_TARGET: &str = "dswipe_application";

/// A captured lifecycle event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SwipeEvent {
    /// Event target (e.g., "dswipe_application::swipe::orchestrator")
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR)
    pub level: String,
    pub message: String,
    /// Structured fields from the event itself
    pub fields: HashMap<String, Value>,
    /// Fields of the enclosing spans (e.g., message_id, is_user_message)
    pub span: HashMap<String, Value>,
    pub timestamp: String,
}

/// Forwards orchestrator events to a channel.
pub struct SwipeEventLayer {
    sender: mpsc::UnboundedSender<SwipeEvent>,
}

impl SwipeEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<SwipeEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SwipeEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

/// Span fields stored in the span's extensions when it is created.
struct SpanFields(HashMap<String, Value>);

impl<S> Layer<S> for SwipeEventLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        span.extensions_mut().insert(SpanFields(fields));
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with(ORCHESTRATOR_TARGET) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        // Outer spans first so inner ones win on name clashes.
        let mut span_fields = HashMap::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(stored) = span.extensions().get::<SpanFields>() {
                    span_fields.extend(stored.0.clone());
                }
            }
        }

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let swipe_event = SwipeEvent {
            target: metadata.target().to_string(),
            level: metadata.level().to_string(),
            message,
            fields,
            span: span_fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(swipe_event);
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), Value::from(format!("{:?}", value)));
    }
}
