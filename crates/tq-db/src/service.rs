//! Service layer keeping the relational store and the document store in step.
//!
//! `CandidateStore` wraps `TqDb` (relational access) and `SnapshotWriter`
//! (document store). Repo methods are implemented as `impl CandidateStore`
//! blocks under `repos/` and `snapshot/`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tq_config::StoreConfig;
use tq_core::entities::Entity;
use tq_core::snapshot::Snapshot;

use crate::TqDb;
use crate::error::StoreError;
use crate::helpers::encode_attributes;
use crate::repos::entity::{SELECT_ALL_ENTITIES, query_entities};
use crate::snapshot::writer::SnapshotWriter;

/// Single source of candidate data.
///
/// Every entity mutation follows this protocol while holding the write lock:
/// 1. Read the pre-call entity set and game targets
/// 2. Begin transaction and execute SQL
/// 3. Stage the new document snapshot next to the target file
/// 4. Commit the transaction
/// 5. Rename the staged snapshot into place
///
/// A failure in 2-3 rolls back and drops the staged file. A failed rename in
/// 5 restores the pre-call entity set and game targets in the relational store.
pub struct CandidateStore {
    db: TqDb,
    documents: SnapshotWriter,
    write_lock: Mutex<()>,
}

impl CandidateStore {
    /// Open both stores as described by `config` for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either store cannot be opened.
    pub async fn open(config: &StoreConfig, root: &Path) -> Result<Self, StoreError> {
        let db_path = config.database_path_in(root);
        if !config.is_in_memory() {
            let data_dir = config.data_dir_in(root);
            std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::StoreUnavailable {
                path: data_dir.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Self::open_local(&db_path.to_string_lossy(), config.snapshot_path_in(root)).await
    }

    /// Open a local relational store (`":memory:"` for tests) and a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or the snapshot
    /// directory cannot be created.
    pub async fn open_local(db_path: &str, snapshot_path: PathBuf) -> Result<Self, StoreError> {
        let db = TqDb::open_local(db_path).await?;
        let documents = SnapshotWriter::new(snapshot_path)?;
        tracing::debug!(db = db_path, snapshot = %documents.path().display(), "candidate store opened");
        Ok(Self {
            db,
            documents,
            write_lock: Mutex::new(()),
        })
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &TqDb {
        &self.db
    }

    /// Location of the document store.
    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        self.documents.path()
    }

    pub(crate) const fn documents(&self) -> &SnapshotWriter {
        &self.documents
    }

    /// Serialize writers. Held for the whole mutation protocol.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Step 1 of the mutation protocol: everything a failed install must put back.
    pub(crate) async fn prior_state(&self) -> Result<PriorState, StoreError> {
        let entities = self.list_all().await?;
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT id, target_entity_id FROM games WHERE target_entity_id IS NOT NULL ORDER BY id",
                (),
            )
            .await?;
        let mut game_targets = Vec::new();
        while let Some(row) = rows.next().await? {
            game_targets.push((row.get::<i64>(0)?, row.get::<i64>(1)?));
        }
        Ok(PriorState {
            entities,
            game_targets,
        })
    }

    /// Steps 3-5 of the mutation protocol.
    ///
    /// `prior` is the state read before the transaction began; it is what
    /// the relational store is restored to if the snapshot cannot be
    /// installed after commit.
    pub(crate) async fn commit_with_snapshot(
        &self,
        tx: libsql::Transaction,
        prior: &PriorState,
    ) -> Result<Snapshot, StoreError> {
        let entities = match query_entities(&tx, SELECT_ALL_ENTITIES, ()).await {
            Ok(entities) => entities,
            Err(e) => return Err(rollback(tx, e).await),
        };
        let snapshot = Snapshot::from_entities(&entities, Utc::now());

        let staged = match self.documents.stage(&snapshot) {
            Ok(staged) => staged,
            Err(e) => return Err(rollback(tx, e).await),
        };

        tx.commit().await?;

        if let Err(e) = staged.commit() {
            tracing::warn!(error = %e, "snapshot install failed after commit; restoring relational state");
            if let Err(restore) = self.restore(prior).await {
                tracing::error!(error = %restore, "failed to restore relational state");
            }
            return Err(e);
        }

        Ok(snapshot)
    }

    /// Put the `entities` table back to exactly `prior`, then re-link the
    /// games whose target was cleared by `ON DELETE SET NULL`.
    async fn restore(&self, prior: &PriorState) -> Result<(), StoreError> {
        let tx = self.db.conn().transaction().await?;
        let keep: Vec<String> = prior.entities.iter().map(|e| e.id.to_string()).collect();
        let delete = if keep.is_empty() {
            "DELETE FROM entities".to_string()
        } else {
            format!("DELETE FROM entities WHERE id NOT IN ({})", keep.join(", "))
        };
        if let Err(e) = tx.execute(&delete, ()).await {
            return Err(rollback(tx, e.into()).await);
        }

        for entity in &prior.entities {
            let attributes = encode_attributes(&entity.attributes)?;
            let result = tx
                .execute(
                    "INSERT INTO entities (id, name, attributes, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        attributes = excluded.attributes,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at",
                    libsql::params![
                        entity.id,
                        entity.name.as_str(),
                        attributes,
                        entity.created_at.to_rfc3339(),
                        entity.updated_at.to_rfc3339()
                    ],
                )
                .await;
            if let Err(e) = result {
                return Err(rollback(tx, e.into()).await);
            }
        }

        for &(game_id, target) in &prior.game_targets {
            let result = tx
                .execute(
                    "UPDATE games SET target_entity_id = ?2 WHERE id = ?1 AND target_entity_id IS NULL",
                    libsql::params![game_id, target],
                )
                .await;
            if let Err(e) = result {
                return Err(rollback(tx, e.into()).await);
            }
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Relational state captured under the write lock before a mutation.
pub(crate) struct PriorState {
    pub(crate) entities: Vec<Entity>,
    /// `(game id, target entity id)` for every game with a target.
    game_targets: Vec<(i64, i64)>,
}

/// Roll back `tx` and hand back the error that caused it.
pub(crate) async fn rollback(tx: libsql::Transaction, cause: StoreError) -> StoreError {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "rollback failed");
    }
    cause
}
