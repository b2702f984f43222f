//! The captured record.
//!
//! An [`EventPayload`] is built fresh for every qualifying interaction and is
//! immutable once stored, except for the handler-merge step a plugin may
//! apply before storage.

use crate::{deep_merge, ClientMeta, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The element an interaction resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSnapshot {
    /// Lower-cased tag name (`window`/`document` for non-element targets).
    pub tag_name: String,
    /// Caller-declared attributes with non-empty values. The pipeline only
    /// writes strings; handlers may merge in any JSON value.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Handler-merged keys with no typed slot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TargetSnapshot {
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// Returns a captured attribute value if it is a string.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

/// A structured record describing one captured interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    /// Interaction type (or the plugin binding name).
    #[serde(rename = "type")]
    pub event_type: String,

    /// ISO-8601 capture time.
    pub timestamp: String,

    pub target: TargetSnapshot,

    pub meta: ClientMeta,

    pub session: String,

    /// Caller-supplied custom payload, attached verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Fields merged in by plugin handlers that have no typed slot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventPayload {
    /// Returns the payload as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deep-merges `fields` into this record.
    ///
    /// Known keys (`type`, `target`, ...) are merged into their typed slots.
    /// Unknown keys are kept in the `extra` map of the record, target, meta
    /// or dimensions object they were merged into. Fails only if a typed
    /// slot receives a value of another JSON type (e.g. `"target": "x"`).
    pub fn merged(self, fields: Map<String, Value>) -> Result<Self> {
        let mut doc = self.to_value()?;
        if !doc.is_object() {
            return Err(Error::InvalidMerge(doc.to_string()));
        }
        deep_merge(&mut doc, Value::Object(fields));
        Ok(serde_json::from_value(doc)?)
    }

    /// Looks up a merged field by JSON pointer (e.g. `/scroll/percentage`).
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<Value> {
        self.to_value().ok()?.pointer(pointer).cloned()
    }
}
