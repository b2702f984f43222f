use crate::NodeRef;
use serde_json::{Map, Value};

/// A raw interaction delivered by the host, before any capture logic.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub event_type: String,
    pub target: NodeRef,
    /// Event-specific properties (pointer coordinates, scroll offsets, ...).
    pub detail: Map<String, Value>,
}

impl Interaction {
    #[must_use]
    pub fn new(event_type: impl Into<String>, target: impl Into<NodeRef>) -> Self {
        Self {
            event_type: event_type.into(),
            target: target.into(),
            detail: Map::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.detail.get(key)
    }

    #[must_use]
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.detail.get(key).and_then(Value::as_f64)
    }
}
