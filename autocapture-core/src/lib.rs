//! Capture engine for autocapture.
//!
//! Listens on a host document, filters and throttles interactions, builds
//! [`EventPayload`](autocapture_types::EventPayload) records and stores them
//! through a [`Persistence`](autocapture_storage::Persistence) backend.
//! Plugins add their own bindings through the
//! [`Plugin`](autocapture_plugin_sdk::Plugin) contract.

pub mod binding;
pub mod config;
mod engine;
mod error;
pub mod filter;
pub mod pipeline;
mod throttle;

pub use binding::{ActiveBinding, BindingLedger, BindingOwner, EventBinding};
pub use engine::{CaptureEngine, EngineState, EventObserver};
pub use error::{CaptureError, CaptureResult};
pub use filter::{should_capture_event, Safelist};
pub use pipeline::{prepare_event_payload, store_payload, PayloadPipeline, PrepareOptions};
pub use throttle::Throttle;
