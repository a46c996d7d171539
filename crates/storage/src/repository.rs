use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A persisted snapshot blob as read back from storage.
///
/// The payload is opaque here; decoding against the catalog happens in
/// `thesis_core::snapshot` so storage never needs the domain types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

/// Repository contract for the completion-store snapshot.
///
/// Every save is a full overwrite of the blob under `key`.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Fetch the snapshot stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_snapshot(&self, key: &str) -> Result<Option<StoredSnapshot>, StorageError>;

    /// Replace the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save_snapshot(
        &self,
        key: &str,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Remove the snapshot stored under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear_snapshot(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    snapshots: Arc<Mutex<HashMap<String, StoredSnapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemoryRepository {
    async fn load_snapshot(&self, key: &str) -> Result<Option<StoredSnapshot>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save_snapshot(
        &self,
        key: &str,
        payload: &str,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            key.to_owned(),
            StoredSnapshot {
                payload: payload.to_owned(),
                saved_at,
            },
        );
        Ok(())
    }

    async fn clear_snapshot(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Holds the snapshot repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotRepository> = Arc::new(InMemoryRepository::new());
        Self { snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesis_core::time::fixed_now;

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_snapshot("thesisProgress3D").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites_previous_blob() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot("k", r#"{"0":{"completed":false}}"#, fixed_now())
            .await
            .unwrap();
        repo.save_snapshot("k", r#"{"0":{"completed":true}}"#, fixed_now())
            .await
            .unwrap();

        let stored = repo.load_snapshot("k").await.unwrap().unwrap();
        assert_eq!(stored.payload, r#"{"0":{"completed":true}}"#);
        assert_eq!(stored.saved_at, fixed_now());
    }

    #[tokio::test]
    async fn clear_removes_blob_and_tolerates_missing_key() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot("k", "{}", fixed_now()).await.unwrap();
        repo.clear_snapshot("k").await.unwrap();
        assert!(repo.load_snapshot("k").await.unwrap().is_none());
        repo.clear_snapshot("k").await.unwrap();
    }

    #[tokio::test]
    async fn storage_clones_share_state() {
        let storage = Storage::in_memory();
        let other = storage.clone();
        storage
            .snapshots
            .save_snapshot("k", "{}", fixed_now())
            .await
            .unwrap();
        assert!(other.snapshots.load_snapshot("k").await.unwrap().is_some());
    }
}
