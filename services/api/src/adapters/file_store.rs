//! services/api/src/adapters/file_store.rs
//!
//! A durable `KeyValueStore` kept in a single JSON file. The file holds one
//! object mapping keys to string values; every write replaces the file
//! through a temporary sibling and a rename.

use async_trait::async_trait;
use bloodreach_core::ports::{KeyValueStore, PortError, PortResult};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

type Entries = BTreeMap<String, String>;

/// A key-value store persisted to a JSON file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store at `path`. The file and its parent directory are
    /// created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> PortResult<Entries> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                PortError::Corrupt(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(storage_error(&self.path, e)),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error(parent, e))?;
        }
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, bytes)
            .await
            .map_err(|e| storage_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| storage_error(&self.path, e))?;
        debug!(path = %self.path.display(), keys = entries.len(), "Wrote key-value file");
        Ok(())
    }
}

fn storage_error(path: &Path, err: std::io::Error) -> PortError {
    PortError::Storage(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> PortResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_entries()
            .await?
            .into_keys()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }
}
