//! Storage for serialized models, addressed by an opaque key.

use crate::error::MlError;
use cscout_core::persistence::{atomic_write, read_optional};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Where trained models live between runs.
pub trait ModelStore: Send + Sync {
    /// Read the blob stored under `key`, `Ok(None)` if there is none.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MlError>;

    /// Store `bytes` under `key`, replacing any previous blob.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MlError>;
}

/// File-backed store. Keys are paths relative to `root`; absolute keys are
/// used as-is.
#[derive(Debug, Clone)]
pub struct FsModelStore {
    root: PathBuf,
}

impl FsModelStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(Path::new(key))
    }
}

impl ModelStore for FsModelStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MlError> {
        Ok(read_optional(&self.path_for(key))?)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MlError> {
        let path = self.path_for(key);
        atomic_write(&path, bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Model written");
        Ok(())
    }
}

/// Process-local store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryModelStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModelStore for InMemoryModelStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MlError> {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MlError> {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
