use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// No candidates to play with.
    #[error("No candidates loaded; add an entity or import a snapshot first")]
    EmptyDataset,

    /// The operation is not valid in the session's current state.
    #[error("Cannot {operation} while session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: String,
    },

    /// Caller supplied input the session cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
