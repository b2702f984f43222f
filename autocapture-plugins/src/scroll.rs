//! Scroll depth.

use autocapture_plugin_sdk::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Records each time the visitor scrolls deeper than before.
///
/// The host reports `scrollY`, `innerHeight` and `bodyHeight` in the
/// interaction detail. Override the throttle with `scroll_throttle_ms`.
#[derive(Debug)]
pub struct ScrollPlugin {
    base: PluginBase,
    deepest: Arc<AtomicU32>,
}

impl ScrollPlugin {
    pub const KEY: &'static str = "scroll";
    pub const DEFAULT_THROTTLE_MS: u64 = 100;

    pub fn new() -> Self {
        Self {
            base: PluginBase::new(Self::KEY),
            deepest: Arc::default(),
        }
    }

    /// Deepest percentage recorded since the last start.
    pub fn deepest(&self) -> u32 {
        self.deepest.load(Ordering::SeqCst)
    }
}

impl Default for ScrollPlugin {
    fn default() -> Self {
        Self::new()
    }
}

/// Scroll depth as a whole percentage, clamped to `0..=100`. `None` when
/// the page cannot scroll.
pub fn scroll_percentage(scroll_y: f64, inner_height: f64, body_height: f64) -> Option<u32> {
    let scrollable = body_height - inner_height;
    if scrollable <= 0.0 || !scroll_y.is_finite() {
        return None;
    }
    let percentage = (scroll_y / scrollable * 100.0).round().clamp(0.0, 100.0);
    Some(percentage as u32)
}

impl Plugin for ScrollPlugin {
    fn key(&self) -> &str {
        self.base.key()
    }

    fn on_init(&self, options: &CaptureOptions) {
        self.base.on_init(options);
    }

    fn options(&self) -> Option<CaptureOptions> {
        self.base.options()
    }

    fn bind(&self, options: &CaptureOptions) -> Vec<BindingRequest> {
        let interval = options
            .extra_u64("scroll_throttle_ms")
            .unwrap_or(Self::DEFAULT_THROTTLE_MS);
        let deepest = Arc::clone(&self.deepest);

        let request = BindingRequest::new(Self::KEY, NodeRef::Window, "scroll", move |interaction, _| {
            let (Some(position), Some(window), Some(body)) = (
                interaction.detail_f64("scrollY"),
                interaction.detail_f64("innerHeight"),
                interaction.detail_f64("bodyHeight"),
            ) else {
                return HandlerOutcome::Skip;
            };
            let Some(percentage) = scroll_percentage(position, window, body) else {
                return HandlerOutcome::Skip;
            };
            if deepest.fetch_max(percentage, Ordering::SeqCst) >= percentage {
                return HandlerOutcome::Skip;
            }
            debug!(percentage, "new scroll depth");
            HandlerOutcome::merge(json!({
                "scroll": {
                    "percentage": percentage,
                    "position": position,
                    "windowSize": window,
                    "bodyHeight": body,
                }
            }))
        })
        .with_throttling(interval);

        vec![request]
    }

    fn on_start(&self) {
        self.deepest.store(0, Ordering::SeqCst);
    }
}
