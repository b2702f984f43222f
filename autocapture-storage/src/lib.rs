//! Persistence layer for autocapture.
//!
//! A [`Persistence`] backend is a synchronous key/value store in the shape
//! of browser local storage: `get_item` / `set_item` on JSON values. Two
//! fixed keys are used on top of it:
//! - [`VISITOR_ID_KEY`] holds the lazily created visitor (session) id
//! - [`EVENTS_KEY`] holds the captured event collection
//!
//! # Backends
//!
//! - [`MemoryPersistence`]: process-local map, the default
//! - [`FilePersistence`]: one JSON document on disk, rewritten atomically

mod error;
mod events;
mod file;
mod memory;

pub use error::{StorageError, StorageResult};
pub use events::{append_event, load_events, session_id, EVENTS_KEY, VISITOR_ID_KEY};
pub use file::FilePersistence;
pub use memory::MemoryPersistence;

use serde_json::Value;

/// A synchronous key/value store.
pub trait Persistence: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: Value) -> StorageResult<()>;
}
