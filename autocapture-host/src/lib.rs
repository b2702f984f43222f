//! Host document model for autocapture.
//!
//! The capture engine never talks to a real browser. It works against this
//! crate's [`Document`], which owns:
//! - an element arena addressed by [`NodeId`]
//! - a listener table keyed by [`NodeRef`] target and event type
//! - the client [`HostEnvironment`] and a [`Clock`]
//!
//! Embedders feed raw [`Interaction`]s into [`Document::dispatch`]; the
//! document walks the propagation path and invokes the matching listeners
//! synchronously, in capture-then-bubble order.

mod attributes;
mod clock;
mod document;
mod environment;
mod error;
mod interaction;
mod node;
mod selector;

pub use attributes::get_attribute_value;
pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{Document, Listener, ListenerId, ListenerOptions};
pub use environment::{is_bot, is_mobile_device, HostEnvironment};
pub use error::{HostError, HostResult};
pub use interaction::Interaction;
pub use node::{Element, NodeId, NodeRef};
pub use selector::Selector;
