//! Processed-event deduplication.
//!
//! Webhook deliveries are at-least-once, so the dispatcher consults this
//! store before acting and records the event identifier afterwards. Reads
//! fail open: a missing or unreadable store means "not yet processed",
//! because silently dropping commands is worse than occasionally repeating
//! an idempotent-by-name board mutation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StorageError;

/// Backend-agnostic membership set of handled event identifiers.
#[async_trait]
pub trait ProcessedStore: Send + Sync {
    /// True iff `event_id` was previously recorded.
    async fn has_processed(&self, event_id: &str) -> bool;

    /// Durably record `event_id`. Recording an already-present identifier
    /// is a no-op.
    async fn mark_processed(&self, event_id: &str) -> Result<(), StorageError>;
}

/// In-memory store, used in tests and single-run deployments.
#[derive(Default)]
pub struct MemoryStore {
    seen: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedStore for MemoryStore {
    async fn has_processed(&self, event_id: &str) -> bool {
        self.seen.lock().await.contains(event_id)
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), StorageError> {
        self.seen.lock().await.insert(event_id.to_string());
        Ok(())
    }
}

/// Append-only file store, one event identifier per line.
///
/// The whole file is re-read on each membership check. The internal mutex
/// makes check-then-append atomic within one process; no coordination is
/// attempted across processes.
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    async fn read_ids(path: &Path) -> HashSet<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                // Fail open: treat an unreadable store as empty.
                tracing::warn!(path = %path.display(), error = %e, "Failed to read processed-event log");
                HashSet::new()
            }
        }
    }

    async fn append(&self, event_id: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{event_id}\n").as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl ProcessedStore for FileStore {
    async fn has_processed(&self, event_id: &str) -> bool {
        let _lock = self.guard.lock().await;
        Self::read_ids(&self.path).await.contains(event_id)
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), StorageError> {
        let _lock = self.guard.lock().await;
        if Self::read_ids(&self.path).await.contains(event_id) {
            return Ok(());
        }
        self.append(event_id).await.map_err(|source| StorageError::Write {
            event_id: event_id.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.has_processed("ev-1").await);
        store.mark_processed("ev-1").await.unwrap();
        assert!(store.has_processed("ev-1").await);
        assert!(!store.has_processed("ev-2").await);
    }

    #[tokio::test]
    async fn memory_store_mark_is_idempotent() {
        let store = MemoryStore::new();
        store.mark_processed("ev-1").await.unwrap();
        store.mark_processed("ev-1").await.unwrap();
        assert!(store.has_processed("ev-1").await);
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("processed.log"));
        assert!(!store.has_processed("ev-1").await);
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.log");
        let store = FileStore::new(&path);

        store.mark_processed("ev-1").await.unwrap();
        assert!(store.has_processed("ev-1").await);
        assert!(!store.has_processed("ev-2").await);

        // A fresh handle over the same file sees the record.
        let reopened = FileStore::new(&path);
        assert!(reopened.has_processed("ev-1").await);
    }

    #[tokio::test]
    async fn file_store_does_not_duplicate_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.log");
        let store = FileStore::new(&path);

        store.mark_processed("ev-1").await.unwrap();
        store.mark_processed("ev-1").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.lines().filter(|l| *l == "ev-1").count(), 1);
    }

    #[tokio::test]
    async fn file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/processed.log");
        let store = FileStore::new(&path);
        store.mark_processed("ev-1").await.unwrap();
        assert!(store.has_processed("ev-1").await);
    }
}
