use std::path::Path;

use chrono::Utc;
use tq_core::snapshot::Snapshot;

use crate::error::StoreError;
use crate::service::CandidateStore;
use crate::snapshot::writer::write_snapshot_file;

impl CandidateStore {
    /// Rewrite the document store from the relational store.
    pub async fn export_snapshot(&self) -> Result<Snapshot, StoreError> {
        let _guard = self.lock_writes().await;
        let snapshot = Snapshot::from_entities(&self.list_all().await?, Utc::now());
        self.documents().write(&snapshot)?;
        tracing::info!(
            path = %self.snapshot_path().display(),
            entities = snapshot.metadata.entity_count,
            "document store rewritten"
        );
        Ok(snapshot)
    }

    /// Write a snapshot of the relational store to `path`.
    ///
    /// The document store itself is not touched.
    pub async fn export_snapshot_to(&self, path: &Path) -> Result<Snapshot, StoreError> {
        let snapshot = Snapshot::from_entities(&self.list_all().await?, Utc::now());
        write_snapshot_file(path, &snapshot)?;
        tracing::info!(path = %path.display(), entities = snapshot.metadata.entity_count, "snapshot exported");
        Ok(snapshot)
    }
}
