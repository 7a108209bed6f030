//! Checkpoint repository
//!
//! A checkpoint is a single durable text slot holding the decimal watermark.
//! Parsing is left to the caller so malformed content can be reported instead
//! of silently replaced.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Repository trait for the watermark checkpoint slot
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Reads the raw slot content
    ///
    /// Returns `None` when nothing has ever been written.
    async fn read(&self) -> Result<Option<String>>;

    /// Replaces the slot content with `value`
    async fn write(&self, value: &str) -> Result<()>;
}

/// Checkpoint stored in a single file on local disk
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    /// Creates a store backed by `path`
    ///
    /// The file and its parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the new content is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn read(&self) -> Result<Option<String>> {
        // Invalid UTF-8 is passed on lossily so it surfaces as a malformed watermark
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No checkpoint at {}", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read checkpoint {}", self.path.display())),
        }
    }

    async fn write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        // Stage then rename so readers never observe a half-written slot
        let staging = self.staging_path();
        let mut file = tokio::fs::File::create(&staging)
            .await
            .with_context(|| format!("Failed to create {}", staging.display()))?;
        file.write_all(value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", staging.display()))?;
        drop(file);
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("Failed to replace checkpoint {}", self.path.display()))?;

        debug!("Checkpoint written to {}", self.path.display());
        Ok(())
    }
}

/// Checkpoint held in process memory
///
/// Used for dry runs, where the real checkpoint must not move.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    slot: Mutex<Option<String>>,
}

impl InMemoryCheckpointStore {
    /// Creates a store pre-filled with `value`
    pub fn with_value(value: Option<String>) -> Self {
        Self {
            slot: Mutex::new(value),
        }
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn read(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("checkpoint slot lock poisoned"))?;
        Ok(slot.clone())
    }

    async fn write(&self, value: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("checkpoint slot lock poisoned"))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path().join("checkpoint.txt"));
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path().join("nested/state/checkpoint.txt"));

        store.write("123456789\n").await.unwrap();
        store.write("42\n").await.unwrap();

        assert_eq!(store.read().await.unwrap().as_deref(), Some("42\n"));
        assert!(!store.staging_path().exists());
    }

    #[tokio::test]
    async fn test_file_store_reads_invalid_utf8_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.txt");
        std::fs::write(&path, [0xff, 0xfe, b'1', b'2']).unwrap();
        let store = FileCheckpointStore::new(&path);

        let raw = store.read().await.unwrap().unwrap();

        assert!(raw.ends_with("12"));
        assert!(raw.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_file_store_write_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.txt");
        let store = FileCheckpointStore::new(&path);

        store.write("981588894067118080\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "981588894067118080\n");
        assert!(!store.staging_path().exists());
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let store = FileCheckpointStore::new("/var/lib/lookout/checkpoint.txt");
        assert_eq!(
            store.staging_path(),
            PathBuf::from("/var/lib/lookout/checkpoint.txt.tmp")
        );
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryCheckpointStore::default();
        assert_eq!(store.read().await.unwrap(), None);

        store.write("7\n").await.unwrap();
        assert_eq!(store.read().await.unwrap().as_deref(), Some("7\n"));

        let seeded = InMemoryCheckpointStore::with_value(Some("9".to_string()));
        assert_eq!(seeded.read().await.unwrap().as_deref(), Some("9"));
    }
}
