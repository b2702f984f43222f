//! Error types for the capture engine.

use autocapture_host::{HostError, NodeRef};
use autocapture_storage::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("plugin with key '{0}' is already registered")]
    DuplicatePlugin(String),

    #[error("no plugin registered under key '{0}'")]
    PluginNotFound(String),

    #[error("interaction target not found: {0}")]
    TargetNotFound(NodeRef),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("payload error: {0}")]
    Payload(#[from] autocapture_types::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
