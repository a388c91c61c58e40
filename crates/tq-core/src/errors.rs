//! Cross-cutting error types for twentyq.
//!
//! Domain-specific errors (`StoreError`, `EngineError`) live in their own
//! crates. The CLI converges everything into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any twentyq crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An attribute key does not match the allow-list pattern.
    #[error("Invalid attribute name '{0}': expected lowercase letters, digits and '_', starting with a letter")]
    InvalidAttributeName(String),
}
