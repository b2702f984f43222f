//! Loading [`CaptureOptions`] from TOML and opening the configured backend.

use crate::{CaptureError, CaptureResult};
use autocapture_storage::{FilePersistence, MemoryPersistence, Persistence};
use autocapture_types::{CaptureOptions, PersistenceKind};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Parses options from TOML text.
pub fn from_toml_str(contents: &str) -> CaptureResult<CaptureOptions> {
    toml::from_str(contents).map_err(|e| CaptureError::Config(e.to_string()))
}

/// Loads options from `path`. A missing file yields the defaults.
pub fn load_from(path: impl AsRef<Path>) -> CaptureResult<CaptureOptions> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No capture config found at {:?}, using defaults", path);
        return Ok(CaptureOptions::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| CaptureError::Config(format!("failed to read {}: {e}", path.display())))?;
    let options = toml::from_str(&contents)
        .map_err(|e| CaptureError::Config(format!("failed to parse {}: {e}", path.display())))?;
    info!("Loaded capture config from {:?}", path);
    Ok(options)
}

/// Like [`load_from`], but any failure falls back to the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> CaptureOptions {
    let path = path.as_ref();
    load_from(path).unwrap_or_else(|e| {
        warn!(
            "Failed to load capture config {:?}: {}. Falling back to defaults.",
            path, e
        );
        CaptureOptions::default()
    })
}

/// Opens the backend named by `kind`. `None` means no persistence.
pub fn open_persistence(kind: &PersistenceKind) -> CaptureResult<Option<Arc<dyn Persistence>>> {
    Ok(match kind {
        PersistenceKind::None => None,
        PersistenceKind::Memory => Some(Arc::new(MemoryPersistence::new())),
        PersistenceKind::File(path) => Some(Arc::new(FilePersistence::open(path)?)),
    })
}
