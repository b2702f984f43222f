//! Declarative binding requests returned by [`crate::Plugin::bind`].

use autocapture_host::{Interaction, ListenerOptions, NodeRef};
use autocapture_types::EventPayload;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// What a binding handler decided about the record built for an interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    /// Abort: the record is not stored and no hooks fire.
    Skip,
    /// Store the record as built.
    Unchanged,
    /// Deep-merge these fields into the record, then store it.
    Merge(Map<String, Value>),
}

impl HandlerOutcome {
    /// Builds a `Merge` from a JSON value. Non-object values leave the
    /// record unchanged.
    #[must_use]
    pub fn merge(fields: Value) -> Self {
        match fields {
            Value::Object(map) => Self::Merge(map),
            _ => Self::Unchanged,
        }
    }
}

/// Handler invoked with the raw interaction and the freshly built record.
pub type BindingHandler = Arc<dyn Fn(&Interaction, &EventPayload) -> HandlerOutcome + Send + Sync>;

/// Predicate that must hold for an interaction to be considered at all.
pub type BindingCondition = Arc<dyn Fn(&Interaction) -> bool + Send + Sync>;

/// One listener a plugin wants installed.
#[derive(Clone)]
pub struct BindingRequest {
    /// Label used as the record `type`; falls back to the event type when empty.
    pub name: String,
    pub target: NodeRef,
    pub event_type: String,
    pub handler: BindingHandler,
    pub options: ListenerOptions,
    /// Minimum milliseconds between accepted interactions.
    pub throttling_ms: Option<u64>,
    pub condition: Option<BindingCondition>,
}

impl BindingRequest {
    pub fn new(
        name: impl Into<String>,
        target: NodeRef,
        event_type: impl Into<String>,
        handler: impl Fn(&Interaction, &EventPayload) -> HandlerOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            target,
            event_type: event_type.into(),
            handler: Arc::new(handler),
            options: ListenerOptions::default(),
            throttling_ms: None,
            condition: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_throttling(mut self, millis: u64) -> Self {
        self.throttling_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn with_condition(
        mut self,
        condition: impl Fn(&Interaction) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }
}

impl fmt::Debug for BindingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRequest")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("event_type", &self.event_type)
            .field("options", &self.options)
            .field("throttling_ms", &self.throttling_ms)
            .field("condition", &self.condition.is_some())
            .finish_non_exhaustive()
    }
}
