use autocapture_plugin_sdk::prelude::*;

/// Samples pointer positions. Override the throttle with
/// `mouse_throttle_ms`.
#[derive(Debug)]
pub struct MouseMovementPlugin {
    base: PluginBase,
}

impl MouseMovementPlugin {
    pub const KEY: &'static str = "mouse-movement";
    pub const DEFAULT_THROTTLE_MS: u64 = 200;

    pub fn new() -> Self {
        Self {
            base: PluginBase::new(Self::KEY),
        }
    }
}

impl Default for MouseMovementPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for MouseMovementPlugin {
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
            .extra_u64("mouse_throttle_ms")
            .unwrap_or(Self::DEFAULT_THROTTLE_MS);

        let request = BindingRequest::new(Self::KEY, NodeRef::Document, "mousemove", |interaction, _| {
            HandlerOutcome::merge(json!({
                "mouse": {
                    "x": interaction.detail("x"),
                    "y": interaction.detail("y"),
                }
            }))
        })
        .with_condition(|interaction| {
            interaction.detail_f64("x").is_some() && interaction.detail_f64("y").is_some()
        })
        .with_throttling(interval);

        vec![request]
    }
}
