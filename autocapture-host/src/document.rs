//! The host document: element arena, listener table and dispatch.

use crate::{
    Clock, Element, HostEnvironment, HostError, HostResult, Interaction, NodeId, NodeRef,
    Selector, SystemClock,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// A listener callback. Runs synchronously inside [`Document::dispatch`].
pub type Listener = Arc<dyn Fn(&Interaction) + Send + Sync>;

/// Options accepted by [`Document::add_event_listener`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerOptions {
    /// Fire during the capture phase instead of the bubble phase.
    pub capture: bool,
    /// Remove the listener after its first invocation.
    pub once: bool,
    /// Advisory only; listeners cannot cancel interactions here.
    pub passive: bool,
}

/// Handle returned by [`Document::add_event_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

struct ListenerEntry {
    id: ListenerId,
    target: NodeRef,
    event_type: String,
    options: ListenerOptions,
    listener: Listener,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Capture,
    AtTarget,
    Bubble,
}

impl ListenerEntry {
    fn fires_in(&self, phase: Phase) -> bool {
        match phase {
            Phase::Capture => self.options.capture,
            Phase::AtTarget => true,
            Phase::Bubble => !self.options.capture,
        }
    }
}

/// The document an engine observes.
pub struct Document {
    nodes: RwLock<BTreeMap<NodeId, Element>>,
    next_node: AtomicU64,
    listeners: Mutex<Vec<ListenerEntry>>,
    next_listener: AtomicU64,
    environment: RwLock<HostEnvironment>,
    clock: Arc<dyn Clock>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            next_node: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
            environment: RwLock::new(HostEnvironment::default()),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    // ── Environment ──────────────────────────────────────────────

    pub fn environment(&self) -> HostEnvironment {
        self.environment
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_environment(&self, environment: HostEnvironment) {
        *self
            .environment
            .write()
            .unwrap_or_else(PoisonError::into_inner) = environment;
    }

    pub fn update_environment(&self, f: impl FnOnce(&mut HostEnvironment)) {
        let mut guard = self
            .environment
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
    }

    // ── Elements ─────────────────────────────────────────────────

    /// Adds an element and returns its handle.
    pub fn insert(&self, element: Element) -> NodeId {
        let id = NodeId::from_raw(self.next_node.fetch_add(1, Ordering::SeqCst));
        self.insert_with_id(id, element);
        id
    }

    /// Adds an element under a caller-chosen handle, replacing any previous
    /// element with that handle.
    pub fn insert_with_id(&self, id: NodeId, element: Element) {
        self.next_node
            .fetch_max(id.as_raw().saturating_add(1), Ordering::SeqCst);
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, element);
    }

    pub fn remove(&self, id: NodeId) -> Option<Element> {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn element(&self, id: NodeId) -> Option<Element> {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Applies `f` to an element in place. Returns false if it is unknown.
    pub fn update_element(&self, id: NodeId, f: impl FnOnce(&mut Element)) -> bool {
        match self
            .nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&id)
        {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    /// Whether `target` can carry listeners in this document.
    pub fn contains(&self, target: NodeRef) -> bool {
        match target {
            NodeRef::Window | NodeRef::Document => true,
            NodeRef::Element(id) => self
                .nodes
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&id),
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<Element> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = Vec::new();
        let mut current = nodes.get(&id).and_then(|e| e.parent);
        while let Some(parent_id) = current {
            // A cyclic parent chain would otherwise never terminate.
            if out.len() >= nodes.len() {
                break;
            }
            let Some(parent) = nodes.get(&parent_id) else {
                break;
            };
            current = parent.parent;
            out.push(parent.clone());
        }
        out
    }

    /// Follows `use_element` indirection to the element that carries the
    /// semantic attributes.
    pub fn resolve(&self, target: NodeRef) -> HostResult<NodeRef> {
        let NodeRef::Element(mut id) = target else {
            return Ok(target);
        };
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let mut element = nodes.get(&id).ok_or(HostError::UnknownNode(target))?;
        let mut hops = 0;
        while let Some(proxied) = element.use_element {
            match nodes.get(&proxied) {
                Some(next) if hops < nodes.len() => {
                    id = proxied;
                    element = next;
                    hops += 1;
                }
                _ => break,
            }
        }
        Ok(NodeRef::Element(id))
    }

    /// Tests an element against a selector, including descendant combinators.
    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        match self.element(id) {
            Some(element) => selector.matches(&element, &self.ancestors(id)),
            None => false,
        }
    }

    // ── Listeners ────────────────────────────────────────────────

    pub fn add_event_listener(
        &self,
        target: NodeRef,
        event_type: &str,
        listener: Listener,
        options: ListenerOptions,
    ) -> HostResult<ListenerId> {
        if event_type.is_empty() {
            return Err(HostError::EmptyEventType);
        }
        if !self.contains(target) {
            return Err(HostError::UnknownNode(target));
        }
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.lock_listeners().push(ListenerEntry {
            id,
            target,
            event_type: event_type.to_string(),
            options,
            listener,
        });
        debug!(listener = %id, node = %target, event_type, "listener added");
        Ok(id)
    }

    /// Removes a listener. Returns false if it was already gone.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    /// Delivers an interaction to every listener on its propagation path.
    ///
    /// Listeners are invoked outside the table lock, so they may add or
    /// remove listeners (including themselves) while running. Returns the
    /// number of listeners invoked.
    pub fn dispatch(&self, interaction: &Interaction) -> usize {
        let path = self.propagation_path(interaction.target);
        if path.is_empty() {
            debug!(node = %interaction.target, "dispatch to unknown target ignored");
            return 0;
        }

        let mut order: Vec<(NodeRef, Phase)> = Vec::with_capacity(path.len() * 2);
        order.extend(path[1..].iter().rev().map(|node| (*node, Phase::Capture)));
        order.push((path[0], Phase::AtTarget));
        order.extend(path[1..].iter().map(|node| (*node, Phase::Bubble)));

        let mut invoked = 0;
        for (node, phase) in order {
            for listener in self.take_listeners(node, &interaction.event_type, phase) {
                listener(interaction);
                invoked += 1;
            }
        }
        invoked
    }

    fn propagation_path(&self, target: NodeRef) -> Vec<NodeRef> {
        match target {
            NodeRef::Window => vec![NodeRef::Window],
            NodeRef::Document => vec![NodeRef::Document, NodeRef::Window],
            NodeRef::Element(id) => {
                if !self.contains(target) {
                    return Vec::new();
                }
                let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
                let mut path = vec![target];
                let mut current = nodes.get(&id).and_then(|e| e.parent);
                while let Some(parent) = current {
                    if path.len() > nodes.len() || !nodes.contains_key(&parent) {
                        break;
                    }
                    path.push(NodeRef::Element(parent));
                    current = nodes.get(&parent).and_then(|e| e.parent);
                }
                path.push(NodeRef::Document);
                path.push(NodeRef::Window);
                path
            }
        }
    }

    /// Snapshots the listeners for one node and phase, dropping `once`
    /// listeners from the table as they are taken.
    fn take_listeners(&self, node: NodeRef, event_type: &str, phase: Phase) -> Vec<Listener> {
        let mut listeners = self.lock_listeners();
        let mut taken = Vec::new();
        listeners.retain(|entry| {
            if entry.target != node || entry.event_type != event_type || !entry.fires_in(phase) {
                return true;
            }
            taken.push(Arc::clone(&entry.listener));
            !entry.options.once
        });
        taken
    }

    fn lock_listeners(&self) -> std::sync::MutexGuard<'_, Vec<ListenerEntry>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
