//! Extracted event payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of an archive's `Records` collection.
///
/// The payload is passed to the event index verbatim; no schema is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(pub Value);

impl EventRecord {
    /// The record's `eventName` field, when present. Used for log context only.
    pub fn event_name(&self) -> Option<&str> {
        self.0.get("eventName").and_then(Value::as_str)
    }

    /// Borrow the raw payload.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw payload.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for EventRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
