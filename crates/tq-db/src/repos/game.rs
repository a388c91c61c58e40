//! Game log repository.
//!
//! Games are append-only and never touch entity rows or the document store.

use chrono::Utc;
use tq_core::entities::{GameRecord, QuestionTrace, StoredGame};

use crate::error::StoreError;
use crate::helpers::parse_datetime;
use crate::service::{CandidateStore, rollback};

impl CandidateStore {
    /// Persist a finished game and its question trace in one transaction.
    ///
    /// Returns the new game id.
    pub async fn record_game(&self, record: &GameRecord) -> Result<i64, StoreError> {
        let _guard = self.lock_writes().await;
        let tx = self.db().conn().transaction().await?;

        let inserted = tx
            .execute(
                "INSERT INTO games (target_entity_id, success, attempts, played_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    record.target_entity_id,
                    i64::from(record.success),
                    i64::from(record.attempts),
                    Utc::now().to_rfc3339()
                ],
            )
            .await;
        if let Err(e) = inserted {
            return Err(rollback(tx, e.into()).await);
        }
        let game_id = tx.last_insert_rowid();

        for (ordinal, step) in record.trace.iter().enumerate() {
            let result = tx
                .execute(
                    "INSERT INTO game_questions (game_id, attribute, expected_value, user_value, ordinal)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    libsql::params![
                        game_id,
                        step.attribute.as_str(),
                        step.expected_value.as_str(),
                        step.user_value.as_str(),
                        i64::try_from(ordinal).unwrap_or(i64::MAX)
                    ],
                )
                .await;
            if let Err(e) = result {
                return Err(rollback(tx, e.into()).await);
            }
        }

        tx.commit().await?;
        tracing::info!(
            game_id,
            success = record.success,
            attempts = record.attempts,
            questions = record.trace.len(),
            "game recorded"
        );
        Ok(game_id)
    }

    /// A stored game with its trace in asked order.
    pub async fn get_game(&self, id: i64) -> Result<StoredGame, StoreError> {
        let conn = self.db().conn();
        let mut rows = conn
            .query(
                "SELECT id, target_entity_id, success, attempts, played_at FROM games WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or(StoreError::NotFound { kind: "game", id })?;

        let target_entity_id = row.get::<Option<i64>>(1)?;
        let success = row.get::<i64>(2)? != 0;
        let attempts = u32::try_from(row.get::<i64>(3)?)
            .map_err(|e| StoreError::Query(format!("attempts out of range: {e}")))?;
        let played_at = parse_datetime(&row.get::<String>(4)?)?;

        let mut trace = Vec::new();
        let mut rows = conn
            .query(
                "SELECT attribute, expected_value, user_value FROM game_questions
                 WHERE game_id = ?1 ORDER BY ordinal",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            trace.push(QuestionTrace {
                attribute: row.get::<String>(0)?,
                expected_value: row.get::<String>(1)?,
                user_value: row.get::<String>(2)?,
            });
        }

        Ok(StoredGame {
            id,
            record: GameRecord {
                target_entity_id,
                success,
                attempts,
                trace,
            },
            played_at,
        })
    }
}
