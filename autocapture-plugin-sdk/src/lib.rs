//! SDK for building autocapture plugins.
//!
//! A plugin is any `Send + Sync` value implementing [`Plugin`]. Every hook
//! has a no-op default, so a plugin only overrides what it uses. Plugins
//! that need to remember the engine options compose a [`PluginBase`]
//! instead of re-implementing the storage.
//!
//! # Example
//!
//! ```
//! use autocapture_plugin_sdk::prelude::*;
//!
//! struct ResizePlugin {
//!     base: PluginBase,
//! }
//!
//! impl Plugin for ResizePlugin {
//!     fn key(&self) -> &str {
//!         self.base.key()
//!     }
//!
//!     fn on_init(&self, options: &CaptureOptions) {
//!         self.base.on_init(options);
//!     }
//!
//!     fn bind(&self, _options: &CaptureOptions) -> Vec<BindingRequest> {
//!         vec![BindingRequest::new("resize", NodeRef::Window, "resize", |_, _| {
//!             HandlerOutcome::Unchanged
//!         })
//!         .with_throttling(250)]
//!     }
//!
//!     fn options(&self) -> Option<CaptureOptions> {
//!         self.base.options()
//!     }
//! }
//!
//! let plugin = ResizePlugin { base: PluginBase::new("resize") };
//! assert_eq!(plugin.bind(&CaptureOptions::default()).len(), 1);
//! ```

mod binding;
mod plugin;
pub mod prelude;
mod registry;

pub use binding::{BindingCondition, BindingHandler, BindingRequest, HandlerOutcome};
pub use plugin::{Plugin, PluginBase, PluginLifecycle};
pub use registry::PluginRegistry;
