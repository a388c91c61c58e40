use std::path::Path;

use chrono::Utc;
use tq_core::attributes::validate_attribute_names;
use tq_core::responses::ImportReport;
use tq_core::snapshot::{SUPPORTED_VERSIONS, Snapshot, SnapshotEntity};

use crate::error::StoreError;
use crate::helpers::{clean_attributes, encode_attributes};
use crate::service::{CandidateStore, rollback};
use crate::snapshot::writer::read_snapshot_file;

enum Upsert {
    Inserted,
    Updated,
}

impl CandidateStore {
    /// Merge a snapshot into the relational store, matching entities by name.
    ///
    /// Entities without a name or with a rejected attribute key are skipped and
    /// counted in `rejected`. Ids in the snapshot are ignored. On success the
    /// document store is rewritten from the resulting relational state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::SchemaVersion` before touching anything when the
    /// snapshot version is not readable by this build.
    pub async fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportReport, StoreError> {
        if !snapshot.is_supported_version() {
            return Err(StoreError::SchemaVersion {
                found: snapshot.metadata.version.clone(),
                supported: SUPPORTED_VERSIONS.to_string(),
            });
        }

        let _guard = self.lock_writes().await;
        let prior = self.prior_state().await?;
        let tx = self.db().conn().transaction().await?;
        let mut report = ImportReport::default();

        for entry in &snapshot.entities {
            if let Some(reason) = rejection(entry) {
                tracing::warn!(name = %entry.name, reason, "snapshot entity rejected");
                report.rejected += 1;
                continue;
            }
            match upsert(&tx, entry).await {
                Ok(Upsert::Inserted) => report.inserted += 1,
                Ok(Upsert::Updated) => report.updated += 1,
                Err(e) => return Err(rollback(tx, e).await),
            }
        }
        report.total = report.inserted + report.updated;

        self.commit_with_snapshot(tx, &prior).await?;
        tracing::info!(
            inserted = report.inserted,
            updated = report.updated,
            rejected = report.rejected,
            "snapshot imported"
        );
        Ok(report)
    }

    /// Import a snapshot file from an arbitrary path.
    pub async fn import_snapshot_file(&self, path: &Path) -> Result<ImportReport, StoreError> {
        let snapshot = read_snapshot_file(path)?;
        self.import_snapshot(&snapshot).await
    }

    /// Re-import the document store's own file into the relational store.
    pub async fn import_document_store(&self) -> Result<ImportReport, StoreError> {
        let path = self.snapshot_path().to_path_buf();
        self.import_snapshot_file(&path).await
    }

    /// Bootstrap: populate an empty relational store from an existing document store.
    ///
    /// Returns `None` when nothing was imported.
    pub async fn seed_if_empty(&self) -> Result<Option<ImportReport>, StoreError> {
        if self.count().await? > 0 {
            return Ok(None);
        }
        let Some(snapshot) = self.documents().read()? else {
            return Ok(None);
        };
        tracing::info!(
            path = %self.snapshot_path().display(),
            entities = snapshot.entities.len(),
            "seeding relational store from document store"
        );
        self.import_snapshot(&snapshot).await.map(Some)
    }
}

fn rejection(entry: &SnapshotEntity) -> Option<&'static str> {
    if entry.name.trim().is_empty() {
        return Some("missing name");
    }
    if validate_attribute_names(entry.attributes.keys()).is_err() {
        return Some("invalid attribute name");
    }
    None
}

async fn upsert(conn: &libsql::Connection, entry: &SnapshotEntity) -> Result<Upsert, StoreError> {
    let name = entry.name.trim();
    let attributes = encode_attributes(&clean_attributes(&entry.attributes))?;
    let now = Utc::now().to_rfc3339();

    let mut rows = conn
        .query(
            "SELECT id FROM entities WHERE name = ?1 COLLATE NOCASE",
            [name],
        )
        .await?;
    if let Some(row) = rows.next().await? {
        let id = row.get::<i64>(0)?;
        conn.execute(
            "UPDATE entities SET attributes = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![attributes, now, id],
        )
        .await?;
        return Ok(Upsert::Updated);
    }

    conn.execute(
        "INSERT INTO entities (name, attributes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![name, attributes, now.as_str(), now.as_str()],
    )
    .await?;
    Ok(Upsert::Inserted)
}
