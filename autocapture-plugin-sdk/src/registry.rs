//! Ordered plugin store.
//!
//! Keeps insertion order and answers lookups. Key uniqueness is enforced by
//! the engine's `use_plugin`, which checks [`PluginRegistry::contains`]
//! before calling `register`.

use crate::Plugin;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin. Does not check for duplicate keys.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Removes every plugin with `key`, keeping the order of the rest.
    /// Returns the removed plugins.
    pub fn unregister(&mut self, key: &str) -> Vec<Arc<dyn Plugin>> {
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .plugins
            .drain(..)
            .partition(|plugin| plugin.key() == key);
        self.plugins = kept;
        removed
    }

    /// First plugin registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|plugin| plugin.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All plugins in registration order.
    #[must_use]
    pub fn get_all(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|plugin| plugin.key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
