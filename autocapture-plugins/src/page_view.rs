//! Page views.

use autocapture_plugin_sdk::prelude::*;

/// Records a page view on `load` and on history navigation (`popstate`).
///
/// The URL comes from the interaction detail (`url`) when the host
/// reports the new location, otherwise from the client snapshot. The
/// title is read from the `title` detail.
#[derive(Debug)]
pub struct PageViewPlugin {
    base: PluginBase,
}

impl PageViewPlugin {
    pub const KEY: &'static str = "page-view";

    pub fn new() -> Self {
        Self {
            base: PluginBase::new(Self::KEY),
        }
    }
}

impl Default for PageViewPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn page_fields(interaction: &Interaction, payload: &EventPayload) -> HandlerOutcome {
    let url = interaction
        .detail("url")
        .and_then(Value::as_str)
        .unwrap_or(payload.meta.url.as_str());
    let title = interaction
        .detail("title")
        .and_then(Value::as_str)
        .unwrap_or_default();
    HandlerOutcome::merge(json!({ "page": { "url": url, "title": title } }))
}

impl Plugin for PageViewPlugin {
    fn key(&self) -> &str {
        self.base.key()
    }

    fn on_init(&self, options: &CaptureOptions) {
        self.base.on_init(options);
    }

    fn options(&self) -> Option<CaptureOptions> {
        self.base.options()
    }

    fn bind(&self, _options: &CaptureOptions) -> Vec<BindingRequest> {
        ["load", "popstate"]
            .into_iter()
            .map(|event_type| BindingRequest::new(Self::KEY, NodeRef::Window, event_type, page_fields))
            .collect()
    }
}
