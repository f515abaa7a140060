//! Structural failures surfaced to callers of the engine.
//!
//! Per-row problems never show up here; they are carried as
//! [`ValidationIssue`](crate::domain::ValidationIssue) values inside an outcome.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("model '{0}' is not registered")]
    ModelNotFound(String),

    #[error("batch session '{0}' not found")]
    SessionNotFound(String),

    #[error("invalid model descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("batch session '{0}' already exists")]
    SessionExists(String),

    #[error("update to batch session '{0}' would overflow its counters")]
    CountOverflow(String),
}

impl EngineError {
    /// True for both the unknown-model and unknown-batch cases.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::ModelNotFound(_) | EngineError::SessionNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
