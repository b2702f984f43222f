//! Core type definitions for autocapture.
//!
//! This crate defines the host-agnostic value types shared by every other
//! crate in the workspace:
//! - Session identifiers (UUID v4 strings)
//! - The captured record ([`EventPayload`]) and its target/environment parts
//! - Engine-wide configuration ([`CaptureOptions`])
//! - Deep JSON merge used when a plugin handler enriches a record
//!
//! Nothing here touches the host document or persistence; those live in
//! `autocapture-host` and `autocapture-storage`.

mod event;
mod ids;
mod merge;
mod meta;
mod options;

pub use event::{EventPayload, TargetSnapshot};
pub use ids::SessionId;
pub use merge::deep_merge;
pub use meta::{ClientMeta, Dimensions};
pub use options::{
    CaptureKind, CaptureOptions, PersistenceKind, ThrottleScope, DEFAULT_ATTRIBUTES,
    DEFAULT_ELEMENTS,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("merge target must be a JSON object, got {0}")]
    InvalidMerge(String),
}
