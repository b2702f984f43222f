//! Base-interaction filtering: capturable elements and the safelist.

use autocapture_host::{Document, Element, NodeId, Selector};
use tracing::warn;

/// Interaction types the base path ever records.
pub const VALID_INTERACTIONS: &[&str] = &[
    "submit",
    "input",
    "change",
    "click",
    "mousedown",
    "mouseup",
    "dblclick",
    "contextmenu",
    "touchstart",
    "touchmove",
    "touchend",
    "touchcancel",
];

/// True when `element` is one of the capturable `elements` and
/// `event_type` is a valid interaction for it. Tag comparison ignores case.
pub fn should_capture_event(elements: &[String], element: &Element, event_type: &str) -> bool {
    let tag = element.tag();
    elements.iter().any(|e| e.eq_ignore_ascii_case(&tag))
        && VALID_INTERACTIONS.contains(&event_type)
}

/// Parsed safelist selectors.
#[derive(Debug, Clone, Default)]
pub struct Safelist {
    selectors: Vec<Selector>,
}

impl Safelist {
    /// Parses every selector. Invalid selectors are logged and ignored so one
    /// typo does not disable capture altogether.
    pub fn parse<S: AsRef<str>>(sources: &[S]) -> Self {
        let selectors = sources
            .iter()
            .filter_map(|source| match Selector::parse(source.as_ref()) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    warn!(selector = source.as_ref(), error = %e, "ignoring safelist entry");
                    None
                }
            })
            .collect();
        Self { selectors }
    }

    /// True when the element matches any safelist selector.
    pub fn excludes(&self, document: &Document, id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| document.matches(id, selector))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}
