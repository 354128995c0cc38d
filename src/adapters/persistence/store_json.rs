//! Implements StoragePort using a single JSON file.
//!
//! The whole diary lives in one blob; no partial updates. Saves use the
//! write-replace pattern so a crash mid-write can never leave a torn blob:
//! 1. Write to temp file
//! 2. sync_all() to ensure flush to disk
//! 3. Atomic rename to target path

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::DomainError;
use crate::ports::StoragePort;

/// JSON file-based blob storage.
pub struct JsonStore {
    path: std::path::PathBuf,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl StoragePort for JsonStore {
    async fn read(&self) -> Result<Option<String>, DomainError> {
        match fs::read_to_string(&self.path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(format!("read blob: {e}"))),
        }
    }

    async fn write(&self, blob: &str) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(format!("create data dir: {e}")))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {e}")))?;
        f.write_all(blob.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {e}")))?;
        // Ensure data is flushed to disk before rename
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {e}")))?;
        drop(f); // Close file handle before rename

        // Atomic rename: replaces target file in one operation
        // On POSIX this is atomic; on Windows it's as close as we can get
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("plants.json"));
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("plants.json"));
        store.write(r#"[{"id":"plant-1"}]"#).await.unwrap();
        assert_eq!(
            store.read().await.unwrap().as_deref(),
            Some(r#"[{"id":"plant-1"}]"#)
        );
    }

    #[tokio::test]
    async fn rewrite_replaces_the_whole_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("plants.json"));
        store.write("first").await.unwrap();
        store.write("second").await.unwrap();
        assert_eq!(store.read().await.unwrap().as_deref(), Some("second"));
        // No stray temp file after a successful save.
        assert!(!dir.path().join("plants.json.tmp").exists());
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested/deep/plants.json"));
        store.write("[]").await.unwrap();
        assert_eq!(store.read().await.unwrap().as_deref(), Some("[]"));
    }
}
