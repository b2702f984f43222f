//! The capture engine.
//!
//! A [`CaptureEngine`] owns its plugin registry and binding ledger. While
//! started it listens on the host [`Document`] for the configured base
//! interaction kinds and for every binding its plugins request, and turns
//! qualifying interactions into stored [`EventPayload`]s.
//!
//! ```text
//! plugin binding:  condition ─► throttle ─► on_before_capture ─► prepare
//!                  ─► handler (Skip | Unchanged | Merge) ─► store
//!                  ─► engine observer ─► plugin on_event_capture
//!
//! base binding:    element/type check ─► safelist ─► prepare ─► store
//!                  ─► engine observer
//! ```

use crate::binding::{BindingLedger, BindingOwner, EventBinding};
use crate::config::open_persistence;
use crate::filter::{should_capture_event, Safelist};
use crate::pipeline::PayloadPipeline;
use crate::throttle::Throttle;
use crate::{CaptureError, CaptureResult};
use autocapture_host::{Document, Interaction, Listener};
use autocapture_plugin_sdk::{BindingRequest, HandlerOutcome, Plugin, PluginLifecycle, PluginRegistry};
use autocapture_storage::Persistence;
use autocapture_types::{CaptureOptions, EventPayload, ThrottleScope};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Called after every successful store, from both paths.
pub type EventObserver = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// Engine run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Started,
}

/// State shared with every installed listener.
struct EngineShared {
    document: Arc<Document>,
    options: CaptureOptions,
    pipeline: PayloadPipeline,
    safelist: Safelist,
    shared_throttle: Arc<Throttle>,
    observer: RwLock<Option<EventObserver>>,
}

impl EngineShared {
    fn notify(&self, payload: &EventPayload) {
        let observer = self
            .observer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(observer) = observer {
            guarded("observer", "engine", || observer(payload));
        }
    }

    fn throttle_for_binding(&self) -> Arc<Throttle> {
        match self.options.throttle_scope {
            ThrottleScope::PerBinding => Arc::new(Throttle::new()),
            ThrottleScope::Shared => Arc::clone(&self.shared_throttle),
        }
    }

    /// Base path: capturable element and type, not safelisted.
    fn handle_base(&self, interaction: &Interaction) {
        let Some(id) = interaction.target.element() else {
            return;
        };
        let Some(element) = self.document.element(id) else {
            return;
        };
        if !should_capture_event(&self.options.elements, &element, &interaction.event_type) {
            return;
        }
        if self.safelist.excludes(&self.document, id) {
            debug!(event_type = %interaction.event_type, node = %id, "safelisted target, not captured");
            return;
        }

        let payload = match self.pipeline.prepare(interaction, &interaction.event_type) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(event_type = %interaction.event_type, error = %e, "record not prepared");
                return;
            }
        };
        if self.pipeline.store(&payload) {
            self.notify(&payload);
        }
    }

    /// Plugin path for one installed [`BindingRequest`].
    fn handle_plugin(
        &self,
        plugin: &dyn Plugin,
        request: &BindingRequest,
        throttle: &Throttle,
        interaction: &Interaction,
    ) {
        let key = plugin.key();

        if let Some(condition) = &request.condition {
            match guarded("condition", key, || condition(interaction)) {
                Some(true) => {}
                Some(false) | None => return,
            }
        }

        if let Some(interval) = request.throttling_ms {
            if !throttle.admit(self.document.now_millis(), interval) {
                debug!(plugin_key = %key, event_type = %interaction.event_type, "throttled");
                return;
            }
        }

        match guarded("on_before_capture", key, || plugin.on_before_capture(interaction)) {
            Some(true) => {}
            Some(false) | None => return,
        }

        let label = if request.name.is_empty() {
            interaction.event_type.as_str()
        } else {
            request.name.as_str()
        };
        let payload = match self.pipeline.prepare(interaction, label) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(plugin_key = %key, error = %e, "record not prepared");
                return;
            }
        };

        let Some(outcome) = guarded("handler", key, || (request.handler)(interaction, &payload))
        else {
            return;
        };
        let payload = match outcome {
            HandlerOutcome::Skip => return,
            HandlerOutcome::Unchanged => payload,
            HandlerOutcome::Merge(fields) => match payload.merged(fields) {
                Ok(merged) => merged,
                Err(e) => {
                    warn!(plugin_key = %key, error = %e, "handler fields could not be merged");
                    return;
                }
            },
        };

        if self.pipeline.store(&payload) {
            self.notify(&payload);
            guarded("on_event_capture", key, || plugin.on_event_capture(&payload));
        }
    }
}

/// Runs a third-party callback, turning a panic into a dropped event.
fn guarded<T>(hook: &str, key: &str, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(plugin_key = %key, hook, "callback panicked, event dropped");
            None
        }
    }
}

/// Captures host interactions into stored records.
pub struct CaptureEngine {
    shared: Arc<EngineShared>,
    registry: PluginRegistry,
    lifecycle: HashMap<String, PluginLifecycle>,
    ledger: BindingLedger,
    state: EngineState,
}

impl CaptureEngine {
    /// Creates a stopped engine, opening the backend named in `options`.
    pub fn new(document: Arc<Document>, options: CaptureOptions) -> CaptureResult<Self> {
        let persistence = open_persistence(&options.persistence)?;
        Ok(Self::with_persistence(document, options, persistence))
    }

    /// Creates a stopped engine on an explicit backend (`None` for none).
    pub fn with_persistence(
        document: Arc<Document>,
        options: CaptureOptions,
        persistence: Option<Arc<dyn Persistence>>,
    ) -> Self {
        let pipeline = PayloadPipeline::new(Arc::clone(&document), persistence, &options);
        let safelist = Safelist::parse(&options.safelist);
        let shared = Arc::new(EngineShared {
            document: Arc::clone(&document),
            options,
            pipeline,
            safelist,
            shared_throttle: Arc::new(Throttle::new()),
            observer: RwLock::new(None),
        });
        Self {
            shared,
            registry: PluginRegistry::new(),
            lifecycle: HashMap::new(),
            ledger: BindingLedger::new(document),
            state: EngineState::Stopped,
        }
    }

    /// Replaces the engine's registry and initializes every plugin in
    /// registration order.
    ///
    /// A started engine is stopped first, so the outgoing plugins are torn
    /// down, and is started again on the new registry.
    #[must_use]
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        let was_started = self.is_started();
        if was_started {
            self.stop();
        }
        self.registry = registry;
        self.lifecycle.clear();
        for plugin in self.registry.get_all() {
            plugin.on_init(&self.shared.options);
            self.lifecycle
                .insert(plugin.key().to_string(), PluginLifecycle::Initialized);
        }
        if was_started {
            self.start();
        }
        self
    }

    /// Registers `plugin` in `registry`, rejecting a duplicate key.
    pub fn use_plugin(registry: &mut PluginRegistry, plugin: Arc<dyn Plugin>) -> CaptureResult<()> {
        let key = plugin.key().to_string();
        if registry.contains(&key) {
            return Err(CaptureError::DuplicatePlugin(key));
        }
        registry.register(plugin);
        info!(plugin_key = %key, "Plugin registered");
        Ok(())
    }

    /// Registers and initializes a plugin on this engine. A started engine
    /// installs its bindings and starts it right away.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> CaptureResult<()> {
        Self::use_plugin(&mut self.registry, Arc::clone(&plugin))?;
        plugin.on_init(&self.shared.options);
        self.lifecycle
            .insert(plugin.key().to_string(), PluginLifecycle::Initialized);
        if self.state == EngineState::Started {
            self.start_plugin(&plugin);
        }
        Ok(())
    }

    /// Removes the plugin under `key`, purging its bindings.
    pub fn unregister_plugin(&mut self, key: &str) -> CaptureResult<()> {
        let removed = self.registry.unregister(key);
        if removed.is_empty() {
            return Err(CaptureError::PluginNotFound(key.to_string()));
        }
        let purged = self.ledger.purge_owner(&BindingOwner::Plugin(key.to_string()));
        if self.state == EngineState::Started {
            for plugin in &removed {
                guarded("on_stop", key, || plugin.on_stop());
            }
        }
        self.lifecycle.remove(key);
        info!(plugin_key = %key, purged, "Plugin unregistered");
        Ok(())
    }

    /// Installs the base bindings, then every plugin's bindings in
    /// registration order. No-op when already started.
    pub fn start(&mut self) {
        if self.state == EngineState::Started {
            debug!("start() on a started engine ignored");
            return;
        }

        let mut seen = HashSet::new();
        for kind in &self.shared.options.capture {
            for event_type in kind.event_types() {
                if !seen.insert(*event_type) {
                    continue;
                }
                let shared = Arc::clone(&self.shared);
                let listener: Listener =
                    Arc::new(move |interaction: &Interaction| shared.handle_base(interaction));
                if let Err(e) = self
                    .ledger
                    .bind(EventBinding::new(*event_type, listener), BindingOwner::Base)
                {
                    warn!(event_type, error = %e, "base binding not installed");
                }
            }
        }

        let plugins = self.registry.get_all().to_vec();
        for plugin in &plugins {
            self.start_plugin(plugin);
        }

        self.state = EngineState::Started;
        info!(
            bindings = self.ledger.len(),
            plugins = plugins.len(),
            "Capture engine started"
        );
    }

    fn start_plugin(&mut self, plugin: &Arc<dyn Plugin>) {
        let key = plugin.key().to_string();
        let options = plugin
            .options()
            .unwrap_or_else(|| self.shared.options.clone());
        let requests = guarded("bind", &key, || plugin.bind(&options)).unwrap_or_default();

        for request in requests {
            if request.event_type.is_empty() || !self.shared.document.contains(request.target) {
                warn!(
                    plugin_key = %key,
                    event_type = %request.event_type,
                    node = %request.target,
                    "skipping malformed binding request"
                );
                continue;
            }

            let target = request.target;
            let event_type = request.event_type.clone();
            let options = request.options;
            let listener = self.plugin_listener(Arc::clone(plugin), request);
            let binding = EventBinding::new(event_type, listener)
                .on(target)
                .with_options(options);
            if let Err(e) = self.ledger.bind(binding, BindingOwner::Plugin(key.clone())) {
                warn!(plugin_key = %key, error = %e, "binding not installed");
            }
        }

        guarded("on_start", &key, || plugin.on_start());
        self.lifecycle.insert(key.clone(), PluginLifecycle::Started);
        info!(plugin_key = %key, "Plugin started");
    }

    fn plugin_listener(&self, plugin: Arc<dyn Plugin>, request: BindingRequest) -> Listener {
        let shared = Arc::clone(&self.shared);
        let throttle = shared.throttle_for_binding();
        Arc::new(move |interaction: &Interaction| {
            shared.handle_plugin(plugin.as_ref(), &request, &throttle, interaction);
        })
    }

    /// Purges every binding, then stops every plugin in registration order.
    /// No-op when already stopped.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            debug!("stop() on a stopped engine ignored");
            return;
        }

        let purged = self.ledger.purge();
        for plugin in self.registry.get_all() {
            let key = plugin.key();
            guarded("on_stop", key, || plugin.on_stop());
            self.lifecycle
                .insert(key.to_string(), PluginLifecycle::Stopped);
        }

        self.state = EngineState::Stopped;
        info!(purged, "Capture engine stopped");
    }

    /// Every stored record, oldest first.
    pub fn get_captured_events(&self) -> CaptureResult<Vec<EventPayload>> {
        self.shared.pipeline.captured_events()
    }

    /// Sets the hook called after every successful store.
    pub fn set_event_observer(&self, observer: impl Fn(&EventPayload) + Send + Sync + 'static) {
        *self
            .shared
            .observer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(observer));
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state == EngineState::Started
    }

    /// Number of listeners currently installed by this engine.
    pub fn active_bindings(&self) -> usize {
        self.ledger.len()
    }

    pub fn ledger(&self) -> &BindingLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn plugin_state(&self, key: &str) -> Option<PluginLifecycle> {
        self.lifecycle.get(key).copied()
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.shared.options
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.shared.document
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
