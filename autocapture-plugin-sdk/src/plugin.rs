use crate::BindingRequest;
use autocapture_host::Interaction;
use autocapture_types::{CaptureOptions, EventPayload};
use std::sync::{PoisonError, RwLock};

/// Where a plugin is in its life with an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginLifecycle {
    /// In a registry, `on_init` not yet called.
    Registered,
    /// `on_init` has run.
    Initialized,
    /// Bindings installed and `on_start` called.
    Started,
    /// Bindings purged and `on_stop` called.
    Stopped,
}

/// The capability set every plugin satisfies.
///
/// Hooks run synchronously on the host's dispatch path and must not block.
pub trait Plugin: Send + Sync {
    /// Stable, unique identity.
    fn key(&self) -> &str;

    /// Called once when the plugin joins an engine, with the engine options.
    fn on_init(&self, options: &CaptureOptions) {
        let _ = options;
    }

    /// Listeners this plugin wants installed. May be called once per start.
    fn bind(&self, options: &CaptureOptions) -> Vec<BindingRequest> {
        let _ = options;
        Vec::new()
    }

    /// Called after the plugin's bindings are installed.
    fn on_start(&self) {}

    /// Called after the plugin's bindings are purged.
    fn on_stop(&self) {}

    /// Gate evaluated right before a record is built.
    fn on_before_capture(&self, interaction: &Interaction) -> bool {
        let _ = interaction;
        true
    }

    /// Called after a record from one of this plugin's bindings was stored.
    fn on_event_capture(&self, payload: &EventPayload) {
        let _ = payload;
    }

    /// Options stored by `on_init`, if the plugin keeps them.
    fn options(&self) -> Option<CaptureOptions> {
        None
    }
}

/// Default-implementation helper: a key plus the options handed to `on_init`.
///
/// Concrete plugins hold one as a field and delegate `key`, `on_init` and
/// `options` to it.
#[derive(Debug, Default)]
pub struct PluginBase {
    key: String,
    options: RwLock<Option<CaptureOptions>>,
}

impl PluginBase {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            options: RwLock::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn on_init(&self, options: &CaptureOptions) {
        *self.options.write().unwrap_or_else(PoisonError::into_inner) = Some(options.clone());
    }

    pub fn options(&self) -> Option<CaptureOptions> {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl Plugin for PluginBase {
    fn key(&self) -> &str {
        PluginBase::key(self)
    }

    fn on_init(&self, options: &CaptureOptions) {
        PluginBase::on_init(self, options);
    }

    fn options(&self) -> Option<CaptureOptions> {
        PluginBase::options(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocapture_host::NodeRef;

    struct Bare;
    impl Plugin for Bare {
        fn key(&self) -> &str {
            "bare"
        }
    }

    // ── Default hooks ───────────────────────────────────────────────

    #[test]
    fn default_bind_is_empty() {
        assert!(Bare.bind(&CaptureOptions::default()).is_empty());
    }

    #[test]
    fn default_gate_captures() {
        assert!(Bare.on_before_capture(&Interaction::new("click", NodeRef::Document)));
    }

    #[test]
    fn default_options_are_none() {
        Bare.on_init(&CaptureOptions::default());
        assert!(Bare.options().is_none());
    }

    #[test]
    fn lifecycle_hooks_are_safe_without_bindings() {
        Bare.on_start();
        Bare.on_stop();
        Bare.on_stop();
    }

    // ── PluginBase ──────────────────────────────────────────────────

    #[test]
    fn base_stores_init_options() {
        let base = PluginBase::new("base");
        assert!(!base.is_initialized());
        let opts = CaptureOptions {
            elements: vec!["button".into()],
            ..Default::default()
        };
        Plugin::on_init(&base, &opts);
        assert!(base.is_initialized());
        assert_eq!(Plugin::options(&base), Some(opts));
        assert_eq!(Plugin::key(&base), "base");
    }

    #[test]
    fn base_reinit_replaces_options() {
        let base = PluginBase::new("base");
        base.on_init(&CaptureOptions::default());
        let opts = CaptureOptions {
            mask_text_content: true,
            ..Default::default()
        };
        base.on_init(&opts);
        assert!(base.options().is_some_and(|o| o.mask_text_content));
    }
}
