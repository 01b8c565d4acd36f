//! The event contract consumed by the condition evaluator and stepping engine.

use serde_json::{Map, Value};

/// An opaque domain event: a nominal type plus named fields.
///
/// The engine never constructs or interprets events beyond this contract —
/// defining concrete event types is the caller's responsibility.
pub trait Event: std::fmt::Debug + Send + Sync {
    /// The event's nominal type, compared against `Condition::IsType`.
    fn event_type(&self) -> &str;

    /// Look up a field by name. Absent fields resolve to `Value::Null`,
    /// never an error.
    fn field(&self, name: &str) -> Value;
}

/// A ready-to-use [`Event`] implementation backed by a JSON object, for
/// callers who don't want to implement the trait themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEvent {
    event_type: String,
    fields: Map<String, Value>,
}

impl RecordEvent {
    /// Create an event of the given nominal type with no fields.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Event for RecordEvent {
    fn event_type(&self) -> &str {
        &self.event_type
    }

    fn field(&self, name: &str) -> Value {
        self.fields.get(name).cloned().unwrap_or(Value::Null)
    }
}
