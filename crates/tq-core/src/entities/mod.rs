//! Entity structs for all twentyq domain objects.
//!
//! Each entity maps to a table in the libSQL store. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and schema
//! validation.

mod entity;
mod game;

pub use entity::{AttributeMap, Entity, EntityUpdate, NewEntity};
pub use game::{GameRecord, QuestionTrace, StoredGame};
