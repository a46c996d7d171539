use std::sync::Arc;

use storage::repository::{SnapshotRepository, Storage};
use thesis_core::model::{Catalog, CompletionStore, SectionIndex};
use thesis_core::progress::{ProgressModel, ProgressSnapshot};
use thesis_core::snapshot::{self, STORAGE_KEY, SnapshotError};

use crate::Clock;
use crate::error::{AppServicesError, TrackerError};

/// A serialized store ready to be written to a user-chosen location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub file_name: String,
    pub contents: String,
}

/// Sole owner of the completion store and the only way to mutate it.
///
/// Every mutation writes the full snapshot through to the repository before
/// returning. When the write fails the in-memory change is rolled back, so
/// the store never runs ahead of what is durable.
pub struct TrackerService {
    clock: Clock,
    catalog: Arc<Catalog>,
    store: CompletionStore,
    snapshots: Arc<dyn SnapshotRepository>,
}

impl TrackerService {
    /// Load the persisted store, or start from defaults when nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the repository cannot be read.
    /// Returns `TrackerError::Snapshot` if the persisted blob is unreadable;
    /// the blob is left in place rather than overwritten with defaults.
    pub async fn load(
        clock: Clock,
        catalog: Arc<Catalog>,
        snapshots: Arc<dyn SnapshotRepository>,
    ) -> Result<Self, TrackerError> {
        let store = match snapshots.load_snapshot(STORAGE_KEY).await? {
            Some(stored) => {
                let store = snapshot::decode(&catalog, &stored.payload).inspect_err(|err| {
                    tracing::error!(%err, "persisted progress could not be decoded");
                })?;
                tracing::info!(
                    saved_at = %stored.saved_at,
                    completed = store.completed_count(),
                    "loaded persisted progress"
                );
                store
            }
            None => {
                tracing::info!(sections = catalog.len(), "no saved progress, starting fresh");
                CompletionStore::fresh(&catalog)
            }
        };

        Ok(Self {
            clock,
            catalog,
            store,
            snapshots,
        })
    }

    /// Open (and migrate) `SQLite` storage, then load the tracker from it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading fails.
    pub async fn open_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Arc<Catalog>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::load(clock, catalog, storage.snapshots).await?)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn store(&self) -> &CompletionStore {
        &self.store
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Aggregation view over the current store.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` if the store and catalog disagree in size.
    pub fn model(&self) -> Result<ProgressModel<'_>, TrackerError> {
        Ok(ProgressModel::new(&self.catalog, &self.store)?)
    }

    /// # Errors
    ///
    /// Returns `TrackerError::Progress` if the store and catalog disagree in size.
    pub fn snapshot(&self) -> Result<ProgressSnapshot, TrackerError> {
        Ok(self.model()?.snapshot())
    }

    /// Flip a section's completed flag and return the refreshed aggregates.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` for an unknown index.
    /// Returns `TrackerError::Storage` if persisting fails (the flip is undone).
    pub async fn toggle(&mut self, index: SectionIndex) -> Result<ProgressSnapshot, TrackerError> {
        let previous = self.store.clone();
        let completed = self.store.toggle(index)?;
        self.commit(previous).await?;
        tracing::info!(%index, completed, "toggled section");
        self.snapshot()
    }

    /// Replace a section's note verbatim.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` for an unknown index.
    /// Returns `TrackerError::Storage` if persisting fails (the note is restored).
    pub async fn set_note(
        &mut self,
        index: SectionIndex,
        text: impl Into<String>,
    ) -> Result<(), TrackerError> {
        let previous = self.store.clone();
        self.store.set_note(index, text)?;
        self.commit(previous).await?;
        tracing::debug!(%index, "updated note");
        Ok(())
    }

    /// Record the day a section was actually done.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Progress` for an unknown index.
    /// Returns `TrackerError::Storage` if persisting fails (the date is restored).
    pub async fn set_actual_date(
        &mut self,
        index: SectionIndex,
        label: impl Into<String>,
    ) -> Result<(), TrackerError> {
        let previous = self.store.clone();
        self.store.set_actual_date(index, label)?;
        self.commit(previous).await?;
        tracing::debug!(%index, "updated actual date");
        Ok(())
    }

    /// Discard all progress and the persisted blob.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Storage` if the blob cannot be removed; the
    /// in-memory store is left as it was.
    pub async fn reset(&mut self) -> Result<(), TrackerError> {
        self.snapshots.clear_snapshot(STORAGE_KEY).await?;
        self.store = CompletionStore::fresh(&self.catalog);
        tracing::info!("progress reset");
        Ok(())
    }

    /// Serialize the whole store under a date-stamped file name.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Snapshot` if serialization fails.
    pub fn export(&self) -> Result<ExportDocument, TrackerError> {
        Ok(ExportDocument {
            file_name: snapshot::export_file_name(self.clock.today()),
            contents: snapshot::encode(&self.store)?,
        })
    }

    /// Replace the store wholesale with an imported document.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Snapshot` (a format error) if the payload cannot
    /// be parsed or names sections outside the catalog; the current store is
    /// untouched. Returns `TrackerError::Storage` if persisting fails.
    pub async fn import(&mut self, payload: &str) -> Result<ProgressSnapshot, TrackerError> {
        let imported = snapshot::decode(&self.catalog, payload).inspect_err(|err| {
            tracing::warn!(%err, "rejected progress import");
        })?;
        let previous = std::mem::replace(&mut self.store, imported);
        self.commit(previous).await?;
        tracing::info!(
            completed = self.store.completed_count(),
            "imported progress snapshot"
        );
        self.snapshot()
    }

    /// Import raw file contents. Bytes that are not UTF-8 are a format error
    /// like any other unreadable document.
    ///
    /// # Errors
    ///
    /// Same as [`TrackerService::import`].
    pub async fn import_bytes(&mut self, payload: &[u8]) -> Result<ProgressSnapshot, TrackerError> {
        let text = std::str::from_utf8(payload).map_err(|err| {
            tracing::warn!(%err, "rejected progress import");
            SnapshotError::Format(format!("document is not UTF-8: {err}"))
        })?;
        self.import(text).await
    }

    async fn commit(&mut self, previous: CompletionStore) -> Result<(), TrackerError> {
        if let Err(err) = self.persist().await {
            tracing::warn!(%err, "save failed, rolling back in-memory change");
            self.store = previous;
            return Err(err);
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), TrackerError> {
        let payload = snapshot::encode(&self.store)?;
        self.snapshots
            .save_snapshot(STORAGE_KEY, &payload, self.clock.now())
            .await?;
        tracing::debug!(bytes = payload.len(), "progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use storage::repository::{InMemoryRepository, StorageError, StoredSnapshot};
    use thesis_core::time::fixed_clock;

    async fn service(repo: &InMemoryRepository) -> TrackerService {
        TrackerService::load(
            fixed_clock(),
            Arc::new(Catalog::thesis()),
            Arc::new(repo.clone()),
        )
        .await
        .unwrap()
    }

    /// Reads return `saved`, writes always fail.
    #[derive(Default)]
    struct ReadOnlyRepository {
        saved: Option<StoredSnapshot>,
    }

    impl ReadOnlyRepository {
        /// Preloaded with a store where `index` is completed.
        fn with_completed(index: usize) -> Self {
            let catalog = Catalog::thesis();
            let mut store = CompletionStore::fresh(&catalog);
            store.toggle(SectionIndex::new(index)).unwrap();
            Self {
                saved: Some(StoredSnapshot {
                    payload: snapshot::encode(&store).unwrap(),
                    saved_at: fixed_clock().now(),
                }),
            }
        }
    }

    #[async_trait]
    impl SnapshotRepository for ReadOnlyRepository {
        async fn load_snapshot(&self, _key: &str) -> Result<Option<StoredSnapshot>, StorageError> {
            Ok(self.saved.clone())
        }

        async fn save_snapshot(
            &self,
            _key: &str,
            _payload: &str,
            _saved_at: DateTime<Utc>,
        ) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }

        async fn clear_snapshot(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk full".into()))
        }
    }

    #[tokio::test]
    async fn toggle_writes_through_before_returning() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo).await;

        let snapshot = svc.toggle(SectionIndex::new(0)).await.unwrap();
        assert_eq!(snapshot.overall.completed, 1);
        assert_eq!(snapshot.words_written, 250);
        assert_eq!(snapshot.next_incomplete, Some(SectionIndex::new(1)));

        let stored = repo.load_snapshot(STORAGE_KEY).await.unwrap().unwrap();
        let persisted = snapshot::decode(svc.catalog(), &stored.payload).unwrap();
        assert!(persisted.is_completed(SectionIndex::new(0)));
    }

    #[tokio::test]
    async fn toggle_unknown_index_is_out_of_range() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo).await;
        let err = svc.toggle(SectionIndex::new(99)).await.unwrap_err();
        assert!(matches!(err, TrackerError::Progress(_)));
        assert!(repo.load_snapshot(STORAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_save_rolls_back() {
        let mut svc = TrackerService::load(
            fixed_clock(),
            Arc::new(Catalog::thesis()),
            Arc::new(ReadOnlyRepository::default()),
        )
        .await
        .unwrap();

        let err = svc.toggle(SectionIndex::new(2)).await.unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert!(!svc.store().is_completed(SectionIndex::new(2)));

        assert!(svc.set_note(SectionIndex::new(2), "lost").await.is_err());
        assert!(svc.store().get(SectionIndex::new(2)).unwrap().notes.is_empty());
    }

    #[tokio::test]
    async fn failed_save_rolls_back_import() {
        let mut svc = TrackerService::load(
            fixed_clock(),
            Arc::new(Catalog::thesis()),
            Arc::new(ReadOnlyRepository::with_completed(3)),
        )
        .await
        .unwrap();
        let before = svc.store().clone();

        let err = svc
            .import(r#"{"0":{"completed":true,"notes":"imported"}}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(svc.store(), &before);
        assert!(svc.store().is_completed(SectionIndex::new(3)));
        assert!(!svc.store().is_completed(SectionIndex::new(0)));
    }

    #[tokio::test]
    async fn failed_clear_keeps_progress_on_reset() {
        let mut svc = TrackerService::load(
            fixed_clock(),
            Arc::new(Catalog::thesis()),
            Arc::new(ReadOnlyRepository::with_completed(3)),
        )
        .await
        .unwrap();

        let err = svc.reset().await.unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(svc.store().completed_count(), 1);
        assert!(svc.store().is_completed(SectionIndex::new(3)));
    }

    #[tokio::test]
    async fn non_utf8_import_is_a_format_error() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo).await;
        svc.toggle(SectionIndex::new(1)).await.unwrap();

        let err = svc.import_bytes(&[b'{', 0xff, 0xfe, b'}']).await.unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(svc.store().completed_count(), 1);

        let snapshot = svc
            .import_bytes(br#"{"2":{"completed":true}}"#)
            .await
            .unwrap();
        assert_eq!(snapshot.overall.completed, 1);
        assert!(svc.store().is_completed(SectionIndex::new(2)));
    }

    #[tokio::test]
    async fn reset_clears_store_and_blob() {
        let repo = InMemoryRepository::new();
        let mut svc = service(&repo).await;
        svc.toggle(SectionIndex::new(0)).await.unwrap();
        svc.set_note(SectionIndex::new(0), "done early").await.unwrap();

        svc.reset().await.unwrap();
        assert_eq!(svc.store().completed_count(), 0);
        assert!(repo.load_snapshot(STORAGE_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_resumes_saved_progress() {
        let repo = InMemoryRepository::new();
        {
            let mut svc = service(&repo).await;
            svc.toggle(SectionIndex::new(5)).await.unwrap();
            svc.set_actual_date(SectionIndex::new(5), "Feb 25").await.unwrap();
        }

        let svc = service(&repo).await;
        assert!(svc.store().is_completed(SectionIndex::new(5)));
        assert_eq!(
            svc.store().get(SectionIndex::new(5)).unwrap().actual_date,
            "Feb 25"
        );
    }

    #[tokio::test]
    async fn load_refuses_corrupt_blob() {
        let repo = InMemoryRepository::new();
        repo.save_snapshot(STORAGE_KEY, "not json", fixed_clock().now())
            .await
            .unwrap();

        let result = TrackerService::load(
            fixed_clock(),
            Arc::new(Catalog::thesis()),
            Arc::new(repo.clone()),
        )
        .await;
        assert!(result.is_err_and(|err| err.is_format_error()));
        // left untouched for manual recovery
        let stored = repo.load_snapshot(STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(stored.payload, "not json");
    }

    #[tokio::test]
    async fn export_names_file_by_clock_day() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo).await;
        let doc = svc.export().unwrap();
        assert_eq!(doc.file_name, "thesis-nexus-export-2025-03-01.json");
        assert!(doc.contents.contains("\"actualDate\": \"Feb 20\""));
    }
}
