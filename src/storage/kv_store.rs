//! String-keyed durable storage
//!
//! The habit list is persisted as a single full-snapshot value; every write
//! replaces the prior value, and values are only read back at startup.
//! Implementations can use the filesystem, an in-memory map, etc.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Durable key-value store consumed by the habit list model
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`; `Ok(None)` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key` in full
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// File-backed store: one file per key under a root directory
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new store rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the store (create the root directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Key-value store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Get the store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file path. Keys are plain names, never paths.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
        {
            return Err(AppError::Store(format!("Invalid store key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let value = fs::read_to_string(&path).await?;

        tracing::debug!("Read key {} ({} bytes)", key, value.len());

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;

        // Write to a temp file first, then rename: a reader never
        // observes a partially written value.
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(temp_path, &path).await?;

        tracing::debug!("Wrote key {} ({} bytes)", key, value.len());

        Ok(())
    }
}

/// In-memory store for tests and previews
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("store"));
        store.initialize().await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let (store, _temp) = create_test_store().await;

        let value = store.get("habits").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _temp) = create_test_store().await;

        store.set("habits", "[]").await.unwrap();

        let value = store.get("habits").await.unwrap();
        assert_eq!(value.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_replaces_prior_value() {
        let (store, _temp) = create_test_store().await;

        store.set("habits", "first").await.unwrap();
        store.set("habits", "second").await.unwrap();

        let value = store.get("habits").await.unwrap();
        assert_eq!(value.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let (store, _temp) = create_test_store().await;

        store.set("habits", "[]").await.unwrap();

        assert!(store.root().join("habits").exists());
        assert!(!store.root().join("habits.tmp").exists());
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let (store, _temp) = create_test_store().await;

        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        assert!(store.get("habits").await.unwrap().is_none());

        store.set("habits", "[1]").await.unwrap();
        assert_eq!(store.get("habits").await.unwrap().as_deref(), Some("[1]"));
    }
}
