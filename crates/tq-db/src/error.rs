//! Store error types for tq-db.

use thiserror::Error;

/// Errors from candidate store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The relational store could not be opened.
    #[error("Store unavailable at '{path}': {reason}")]
    StoreUnavailable { path: String, reason: String },

    /// An entity with this name already exists.
    #[error("An entity named '{0}' already exists")]
    DuplicateName(String),

    /// An attribute key failed the allow-list check.
    #[error("Invalid attribute name '{0}'")]
    InvalidAttributeName(String),

    /// Entity name is empty after trimming.
    #[error("Invalid entity name: {0}")]
    InvalidName(String),

    /// Snapshot declares a version this build cannot read.
    #[error("Unsupported snapshot version '{found}' (supported: {supported})")]
    SchemaVersion { found: String, supported: String },

    /// No entity (or game) with the given id.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// Document store read/write failure.
    #[error("Document store error at '{path}': {reason}")]
    Snapshot { path: String, reason: String },

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn snapshot(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Snapshot {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<tq_core::errors::CoreError> for StoreError {
    fn from(error: tq_core::errors::CoreError) -> Self {
        match error {
            tq_core::errors::CoreError::InvalidAttributeName(name) => {
                Self::InvalidAttributeName(name)
            }
        }
    }
}
