//! File-backed store
//!
//! Each key is a file under the store root: key "SavedReminderLists" lives at
//! "<root>/SavedReminderLists.json". Writes go to a temp file that is synced
//! and renamed into place, so the widget process reading the same directory
//! only ever sees complete values.

use super::store::Store;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Directory-backed key-value store
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new store at the given root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Initialize the store (create directory if needed)
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Get file path for a key
    fn get_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return Err(AppError::Store(format!("Invalid store key: {:?}", key)));
        }

        Ok(self.root.join(format!("{}.json", key)))
    }

    /// Get store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.get_path(key)?;

        let mut file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data).await?;

        tracing::debug!("Read key: {} ({} bytes)", key, data.len());

        Ok(Some(data))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.get_path(key)?;
        fs::create_dir_all(&self.root).await?;

        // Write to temp file first (atomic write)
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(value).await?;
        file.sync_all().await?;

        // Rename to final location
        fs::rename(&temp_path, &path).await?;

        tracing::debug!("Wrote key: {} ({} bytes)", key, value.len());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.get_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed key: {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
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
    async fn test_set_and_get() {
        let (store, _temp) = create_test_store().await;

        store.set("SelectedListID", b"abc").await.unwrap();

        let data = store.get("SelectedListID").await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"abc"[..]));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (store, _temp) = create_test_store().await;

        assert!(store.get("SavedReminders").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let (store, _temp) = create_test_store().await;

        store.set("SavedReminderLists", b"[1]").await.unwrap();
        store.set("SavedReminderLists", b"[1,2]").await.unwrap();

        let data = store.get("SavedReminderLists").await.unwrap().unwrap();
        assert_eq!(data, b"[1,2]");
        assert!(store.root().join("SavedReminderLists.json").exists());
        assert!(!store.root().join("SavedReminderLists.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (store, _temp) = create_test_store().await;

        store.set("SavedReminders", b"[]").await.unwrap();
        store.remove("SavedReminders").await.unwrap();
        store.remove("SavedReminders").await.unwrap();

        assert!(store.get("SavedReminders").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let (store, _temp) = create_test_store().await;

        assert!(matches!(
            store.set("../escape", b"x").await,
            Err(AppError::Store(_))
        ));
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_second_instance_reads_same_data() {
        let (store, temp) = create_test_store().await;
        store.set("SelectedListID", b"shared").await.unwrap();

        let reader = FileStore::new(temp.path().join("store"));
        let data = reader.get("SelectedListID").await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"shared"[..]));
    }
}
