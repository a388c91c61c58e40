//! Aggregate game statistics. Pure reads, recomputed on every call.

use tq_core::responses::Statistics;

use crate::error::StoreError;
use crate::helpers::round2;
use crate::service::CandidateStore;

impl CandidateStore {
    pub async fn statistics(&self) -> Result<Statistics, StoreError> {
        let conn = self.db().conn();

        let mut rows = conn
            .query(
                "SELECT COUNT(*), COALESCE(SUM(success), 0), AVG(attempts) FROM games",
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(StoreError::NoResult)?;
        let total_games = u64::try_from(row.get::<i64>(0)?).unwrap_or(0);
        let games_won = u64::try_from(row.get::<i64>(1)?).unwrap_or(0);
        let mean_attempts = row.get::<Option<f64>>(2)?.unwrap_or(0.0);

        let mut rows = conn
            .query(
                "SELECT e.name FROM games g
                 JOIN entities e ON e.id = g.target_entity_id
                 GROUP BY g.target_entity_id
                 ORDER BY COUNT(*) DESC, e.name ASC
                 LIMIT 1",
                (),
            )
            .await?;
        let most_targeted = match rows.next().await? {
            Some(row) => Some(row.get::<String>(0)?),
            None => None,
        };

        #[allow(clippy::cast_precision_loss)]
        let win_rate = if total_games == 0 {
            0.0
        } else {
            games_won as f64 / total_games as f64 * 100.0
        };

        Ok(Statistics {
            total_games,
            games_won,
            win_rate,
            mean_attempts: round2(mean_attempts),
            most_targeted,
            total_entities: self.count().await?,
        })
    }
}
