//! # tq-engine
//!
//! The decision core of twentyq. Synchronous and storage-free:
//! - [`engine::InformationEngine`] holds the candidate snapshot and computes
//!   entropy, information gain, and the best next question.
//! - [`session::GameSession`] drives one game from the first question to a
//!   terminal state and produces the [`GameRecord`](tq_core::entities::GameRecord)
//!   to persist.
//! - [`answer`] turns free-text replies into yes/no.

pub mod answer;
pub mod engine;
pub mod error;
pub mod session;

pub use answer::Answer;
pub use engine::{AttributeQuestion, InformationEngine};
pub use error::EngineError;
pub use session::{
    AnswerOutcome, CONFIDENCE_THRESHOLD, GameSession, MAX_GUESS_ATTEMPTS, Prompt, SessionStatus,
    SessionSummary,
};
