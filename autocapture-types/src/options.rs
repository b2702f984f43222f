//! Engine-wide configuration.
//!
//! The same [`CaptureOptions`] value configures the engine and is handed to
//! every plugin's `on_init`, so plugins can read both the well-known fields
//! and any plugin-specific keys kept in [`CaptureOptions::extra`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Tags captured by the base interaction path when none are configured.
pub const DEFAULT_ELEMENTS: &[&str] = &[
    "a", "button", "form", "input", "select", "textarea", "label",
];

/// Attributes read from the target when none are configured.
pub const DEFAULT_ATTRIBUTES: &[&str] = &[
    "text",
    "className",
    "value",
    "type",
    "tagName",
    "href",
    "src",
    "id",
    "name",
    "placeholder",
    "title",
    "alt",
    "role",
];

/// Base interaction kinds the engine can bind directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureKind {
    Click,
    DoubleClick,
    ContextMenu,
    Input,
    Change,
    Submit,
    /// Expands to `touchstart`, `touchend` and `touchcancel`.
    Touch,
}

impl CaptureKind {
    /// Host event types this kind binds.
    #[must_use]
    pub const fn event_types(self) -> &'static [&'static str] {
        match self {
            Self::Click => &["click"],
            Self::DoubleClick => &["dblclick"],
            Self::ContextMenu => &["contextmenu"],
            Self::Input => &["input"],
            Self::Change => &["change"],
            Self::Submit => &["submit"],
            Self::Touch => &["touchstart", "touchend", "touchcancel"],
        }
    }

    /// All kinds, in binding order.
    pub const ALL: [CaptureKind; 7] = [
        Self::Click,
        Self::DoubleClick,
        Self::ContextMenu,
        Self::Input,
        Self::Change,
        Self::Submit,
        Self::Touch,
    ];
}

/// Where captured records are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceKind {
    /// No backend: every store fails and nothing is retained.
    None,
    /// Process-local key/value store.
    #[default]
    Memory,
    /// JSON file on disk.
    File(PathBuf),
}

/// How throttled plugin bindings share their "last accepted" clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    /// Each installed binding keeps its own last-accepted timestamp.
    #[default]
    PerBinding,
    /// One timestamp for every throttled binding of an engine.
    Shared,
}

/// Engine configuration, deserializable from TOML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Tag names captured on the base interaction path.
    pub elements: Vec<String>,
    /// Attribute names read from the resolved target.
    pub attributes: Vec<String>,
    /// Selectors excluded from base capture.
    pub safelist: Vec<String>,
    /// Base interaction kinds to bind.
    pub capture: Vec<CaptureKind>,
    /// Keys of built-in plugins to install.
    pub plugins: Vec<String>,
    pub persistence: PersistenceKind,
    /// Caller-supplied session id; wins over the stored visitor id.
    pub session_id: Option<String>,
    /// Custom payload attached to every record under `payload`.
    pub payload: Option<Value>,
    pub mask_text_content: bool,
    pub throttle_scope: ThrottleScope,
    /// Keys not recognised by the engine, passed through to plugins.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            elements: DEFAULT_ELEMENTS.iter().map(|s| (*s).to_string()).collect(),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|s| (*s).to_string()).collect(),
            safelist: Vec::new(),
            capture: vec![CaptureKind::Click, CaptureKind::Change, CaptureKind::Submit],
            plugins: Vec::new(),
            persistence: PersistenceKind::Memory,
            session_id: None,
            payload: None,
            mask_text_content: false,
            throttle_scope: ThrottleScope::PerBinding,
            extra: Map::new(),
        }
    }
}

impl CaptureOptions {
    /// Returns a plugin-specific option by key.
    #[must_use]
    pub fn extra_value(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns a plugin-specific numeric option, e.g. a throttle override.
    #[must_use]
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }
}
