//! Everything a plugin author usually needs.

pub use crate::{
    BindingCondition, BindingHandler, BindingRequest, HandlerOutcome, Plugin, PluginBase,
    PluginLifecycle, PluginRegistry,
};
pub use autocapture_host::{Interaction, ListenerOptions, NodeRef};
pub use autocapture_types::{CaptureOptions, EventPayload};
pub use serde_json::{json, Map, Value};
