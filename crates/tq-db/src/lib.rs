//! # tq-db
//!
//! Candidate store for twentyq.
//!
//! Two stores hold the same entity set:
//! - a libSQL relational database (entities, games, per-game question trace),
//! - a JSON document store (a versioned [`Snapshot`](tq_core::snapshot::Snapshot)
//!   file) that is the portable exchange format.
//!
//! [`service::CandidateStore`] is the only writer of both. Every entity
//! mutation leaves the two content-equivalent or fails without touching
//! either.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod snapshot;

use error::StoreError;
use libsql::Builder;

/// Relational database handle.
pub struct TqDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl TqDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StoreUnavailable` if the database cannot be
    /// opened, or `StoreError::Migration` if the schema cannot be applied.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let unavailable = |e: libsql::Error| StoreError::StoreUnavailable {
            path: path.to_string(),
            reason: e.to_string(),
        };
        let db = Builder::new_local(path).build().await.map_err(unavailable)?;
        let conn = db.connect().map_err(unavailable)?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let tq_db = Self { db, conn };
        tq_db.run_migrations().await?;
        Ok(tq_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> TqDb {
        TqDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        for table in ["entities", "games", "game_questions"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn entity_names_are_unique() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO entities (name) VALUES ('Alice')", ())
            .await
            .unwrap();
        let result = db
            .conn()
            .execute("INSERT INTO entities (name) VALUES ('Alice')", ())
            .await;
        assert!(result.is_err(), "duplicate name should be rejected");
    }

    #[tokio::test]
    async fn deleting_entity_keeps_game_with_null_target() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO entities (id, name) VALUES (1, 'Alice')", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO games (id, target_entity_id, success, attempts) VALUES (1, 1, 1, 1)",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute("DELETE FROM entities WHERE id = 1", ())
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT target_entity_id FROM games WHERE id = 1", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<Option<i64>>(0).unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_game_cascades_to_questions() {
        let db = test_db().await;
        db.conn()
            .execute("INSERT INTO games (id, success, attempts) VALUES (1, 0, 3)", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO game_questions (game_id, attribute, expected_value, user_value, ordinal) VALUES (1, 'hair', 'brown', 'yes', 0)",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute("DELETE FROM games WHERE id = 1", ())
            .await
            .unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM game_questions", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }
}
