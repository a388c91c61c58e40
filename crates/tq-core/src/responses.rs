//! Response types returned as JSON by `tq` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Aggregate game statistics (`tq stats`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Statistics {
    pub total_games: u64,
    pub games_won: u64,
    /// Percentage of games won, 0 when no games were played.
    pub win_rate: f64,
    /// Mean guess attempts per game, rounded to two decimals.
    pub mean_attempts: f64,
    /// Name of the entity most often targeted, if any game referenced one.
    pub most_targeted: Option<String>,
    pub total_entities: u64,
}

/// Result of importing a snapshot into the relational store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: u32,
    pub updated: u32,
    pub rejected: u32,
    pub total: u32,
}

/// Result of rewriting the document store from the relational store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SyncReport {
    pub snapshot_path: String,
    pub entity_count: usize,
    pub duration_ms: u64,
}
