use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One asked question in a finished game, in the order it was asked.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionTrace {
    pub attribute: String,
    /// The value the engine tested for.
    pub expected_value: String,
    /// The normalized answer: `"yes"` or `"no"`.
    pub user_value: String,
}

/// Outcome of a finished game, produced by the session and persisted by the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GameRecord {
    /// `None` when the target was never identified or registered.
    pub target_entity_id: Option<i64>,
    pub success: bool,
    pub attempts: u32,
    pub trace: Vec<QuestionTrace>,
}

/// A game row as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StoredGame {
    pub id: i64,
    pub record: GameRecord,
    pub played_at: DateTime<Utc>,
}
