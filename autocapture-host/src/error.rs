//! Error types for the host document.

use crate::NodeRef;
use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    /// The target is not attached to this document.
    #[error("unknown node: {0}")]
    UnknownNode(NodeRef),

    /// A listener was requested for an empty event type.
    #[error("event type must not be empty")]
    EmptyEventType,

    /// A selector could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}
