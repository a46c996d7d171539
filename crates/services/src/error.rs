//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use thesis_core::progress::ProgressError;
use thesis_core::snapshot::SnapshotError;

/// Errors emitted by `TrackerService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// True when an import or persisted payload could not be parsed.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Snapshot(SnapshotError::Format(_)))
    }
}

/// Errors emitted while bootstrapping the tracker.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}
