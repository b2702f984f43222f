//! Built-in plugins.
//!
//! | Key              | Binds                         | Adds to the record |
//! |------------------|-------------------------------|--------------------|
//! | `scroll`         | `scroll` on window            | `scroll`           |
//! | `page-view`      | `load`, `popstate` on window  | `page`             |
//! | `mouse-movement` | `mousemove` on document       | `mouse`            |
//! | `swipe`          | `touchstart`, `touchend`      | `swipe`            |
//!
//! [`builtin`] maps the keys listed in `CaptureOptions::plugins` to
//! instances.

mod mouse;
mod page_view;
mod scroll;
mod swipe;

pub use mouse::MouseMovementPlugin;
pub use page_view::PageViewPlugin;
pub use scroll::{scroll_percentage, ScrollPlugin};
pub use swipe::{classify_swipe, SwipeDirection, SwipePlugin};

use autocapture_plugin_sdk::Plugin;
use std::sync::Arc;

/// Keys accepted by [`builtin`].
pub const BUILTIN_KEYS: [&str; 4] = [
    ScrollPlugin::KEY,
    PageViewPlugin::KEY,
    MouseMovementPlugin::KEY,
    SwipePlugin::KEY,
];

/// Creates the built-in plugin registered under `key`.
pub fn builtin(key: &str) -> Option<Arc<dyn Plugin>> {
    let plugin: Arc<dyn Plugin> = match key {
        ScrollPlugin::KEY => Arc::new(ScrollPlugin::new()),
        PageViewPlugin::KEY => Arc::new(PageViewPlugin::new()),
        MouseMovementPlugin::KEY => Arc::new(MouseMovementPlugin::new()),
        SwipePlugin::KEY => Arc::new(SwipePlugin::new()),
        _ => return None,
    };
    Some(plugin)
}
