use crate::{Persistence, StorageError, StorageResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Stores every key in a single JSON object on disk.
///
/// Each `set_item` rewrites the whole document through a sibling temp file
/// and a rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FilePersistence {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FilePersistence {
    /// Opens (or prepares to create) the store at `path`. Parent directories
    /// are created eagerly.
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!(path = %path.display(), "file persistence opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Corrupt {
                key: self.path.display().to_string(),
                reason: format!("expected a JSON object, found {other}"),
            }),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> StorageResult<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Persistence for FilePersistence {
    fn get_item(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set_item(&self, key: &str, value: Value) -> StorageResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read_document()?;
        document.insert(key.to_string(), value);
        self.write_document(&document)
    }
}
