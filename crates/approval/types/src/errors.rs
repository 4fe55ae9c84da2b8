//! Error types for the approval workflow
//!
//! The first five variants are recoverable business errors the caller
//! acts on (re-fetch and retry, fill the missing field, ask a different
//! role). `CorruptTrail` and `StorePoisoned` are internal invariant
//! violations and never arise from expected business conditions.

/// Errors that can occur in approval workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error(
        "concurrency conflict: snapshot at sequence {expected}, trail at sequence {found}; re-read and retry"
    )]
    ConcurrencyConflict { expected: u64, found: u64 },

    #[error("no discardable revision: {0}")]
    NoDiscardableRevision(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("corrupt audit trail: {0}")]
    CorruptTrail(String),

    #[error("trail store lock poisoned")]
    StorePoisoned,
}

impl WorkflowError {
    /// Check whether the caller can recover by correcting its request
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptTrail(_) | Self::StorePoisoned)
    }
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
