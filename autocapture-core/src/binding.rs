//! Listener bindings and the ledger that tears them down.
//!
//! Every listener the engine installs goes through [`BindingLedger::bind`],
//! so a single [`BindingLedger::purge`] removes all of them.

use crate::CaptureResult;
use autocapture_host::{Document, Listener, ListenerId, ListenerOptions, NodeRef};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Who asked for a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingOwner {
    /// The engine's own base interaction capture.
    Base,
    /// A plugin, by key.
    Plugin(String),
}

impl fmt::Display for BindingOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Plugin(key) => write!(f, "plugin:{key}"),
        }
    }
}

/// One listener waiting to be installed.
pub struct EventBinding {
    event_type: String,
    target: NodeRef,
    handler: Listener,
    options: ListenerOptions,
}

impl EventBinding {
    /// A binding on the document with default options.
    pub fn new(event_type: impl Into<String>, handler: Listener) -> Self {
        Self {
            event_type: event_type.into(),
            target: NodeRef::Document,
            handler,
            options: ListenerOptions::default(),
        }
    }

    #[must_use]
    pub fn on(mut self, target: NodeRef) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }
}

/// A realized, removable listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBinding {
    pub event_type: String,
    pub target: NodeRef,
    pub listener: ListenerId,
    pub owner: BindingOwner,
}

/// Records every installed listener of one engine.
pub struct BindingLedger {
    document: Arc<Document>,
    active: Vec<ActiveBinding>,
}

impl BindingLedger {
    pub fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            active: Vec::new(),
        }
    }

    /// Installs `binding` and records it. Each call creates one independent
    /// entry, even for an identical event type and target.
    pub fn bind(&mut self, binding: EventBinding, owner: BindingOwner) -> CaptureResult<ListenerId> {
        let listener = self.document.add_event_listener(
            binding.target,
            &binding.event_type,
            binding.handler,
            binding.options,
        )?;
        self.active.push(ActiveBinding {
            event_type: binding.event_type,
            target: binding.target,
            listener,
            owner,
        });
        Ok(listener)
    }

    /// Removes every recorded listener and empties the ledger. Listeners
    /// that already removed themselves (`once`) are skipped silently.
    pub fn purge(&mut self) -> usize {
        let purged = self.active.len();
        for binding in self.active.drain(..) {
            self.document.remove_event_listener(binding.listener);
        }
        if purged > 0 {
            debug!(purged, "bindings purged");
        }
        purged
    }

    /// Removes only the listeners installed for `owner`.
    pub fn purge_owner(&mut self, owner: &BindingOwner) -> usize {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.active.drain(..).partition(|b| &b.owner == owner);
        self.active = kept;
        for binding in &removed {
            self.document.remove_event_listener(binding.listener);
        }
        debug!(owner = %owner, purged = removed.len(), "owner bindings purged");
        removed.len()
    }

    pub fn active(&self) -> &[ActiveBinding] {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Drop for BindingLedger {
    fn drop(&mut self) {
        self.purge();
    }
}
