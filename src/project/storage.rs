use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::error::Result;
use crate::export::write_atomically;

const STORAGE_FILE: &str = "local_storage.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntry {
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// String key/value store persisted as one JSON map, mirroring browser
/// local storage semantics: `set_item` always overwrites.
#[derive(Debug)]
pub struct LocalStorage {
    dir: PathBuf,
    entries: BTreeMap<String, StorageEntry>,
}

impl LocalStorage {
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(STORAGE_FILE);

        let entries: BTreeMap<String, StorageEntry> = if path.exists() {
            let content = fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!("Opened local storage at {} ({} entries)", path.display(), entries.len());

        Ok(Self { dir, entries })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn entry(&self, key: &str) -> Option<&StorageEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Memory only changes once the file write has succeeded.
    pub async fn set_item(&mut self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(
            key.to_string(),
            StorageEntry {
                value,
                updated_at: Utc::now(),
            },
        );
        self.flush(&entries).await?;
        self.entries = entries;
        info!("Stored '{}' in local storage", key);
        Ok(())
    }

    async fn flush(&self, entries: &BTreeMap<String, StorageEntry>) -> Result<()> {
        let content = serde_json::to_vec_pretty(entries)?;
        let dir = self.dir.clone();
        let path = self.path();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &content))
            .await
            .map_err(std::io::Error::other)??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_item_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut storage = LocalStorage::open(dir.path()).await.unwrap();
        assert!(storage.is_empty());
        storage.set_item("project_demo", "{}".to_string()).await.unwrap();

        let reopened = LocalStorage::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_item("project_demo"), Some("{}"));
        assert_eq!(reopened.keys().collect::<Vec<_>>(), vec!["project_demo"]);
    }

    #[tokio::test]
    async fn test_set_item_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = LocalStorage::open(dir.path()).await.unwrap();

        storage.set_item("k", "one".to_string()).await.unwrap();
        storage.set_item("k", "two".to_string()).await.unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get_item("k"), Some("two"));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_unchanged() {
        let base = tempfile::tempdir().unwrap();
        let dir = base.path().join("store");
        let mut storage = LocalStorage::open(&dir).await.unwrap();

        // A plain file where the storage directory should be
        std::fs::write(&dir, b"not a directory").unwrap();

        assert!(storage.set_item("k", "v".to_string()).await.is_err());
        assert!(storage.is_empty());
        assert_eq!(storage.get_item("k"), None);
    }
}
