//! Transition requests: what a caller asks the engine to do
//!
//! Payload validation (non-empty description/reason, legal bump kinds)
//! lives here so the state machine and the engine share one notion of a
//! well-formed request.

use crate::{BumpKind, WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};

/// The transitions an actor may request against an artifact
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    SubmitForReview,
    FirstApproval,
    SecondApproval,
    Reject,
    StartNewRevision,
    DiscardRevision,
    /// Post-hoc correction of an audit entry's description; not a
    /// workflow transition, but gated like one
    AnnotateEntry,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::SubmitForReview => "submit for review",
            Self::FirstApproval => "first approval",
            Self::SecondApproval => "second approval",
            Self::Reject => "reject",
            Self::StartNewRevision => "start new revision",
            Self::DiscardRevision => "discard revision",
            Self::AnnotateEntry => "annotate entry",
        };
        write!(f, "{}", label)
    }
}

/// Payload for `submit_for_review`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitPayload {
    pub description: String,
    pub bump: BumpKind,
}

impl SubmitPayload {
    pub fn new(description: impl Into<String>, bump: BumpKind) -> Self {
        Self {
            description: description.into(),
            bump,
        }
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.description.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed(
                "change description is required for submission".into(),
            ));
        }
        Ok(())
    }
}

/// Payload for `start_new_revision` — a bump is mandatory here
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevisionPayload {
    pub description: String,
    pub bump: BumpKind,
}

impl RevisionPayload {
    pub fn new(description: impl Into<String>, bump: BumpKind) -> Self {
        Self {
            description: description.into(),
            bump,
        }
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.description.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed(
                "change description is required to start a revision".into(),
            ));
        }
        if self.bump == BumpKind::None {
            return Err(WorkflowError::ValidationFailed(
                "a new revision must bump the version (minor or major)".into(),
            ));
        }
        Ok(())
    }
}

/// Payload for `reject`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RejectPayload {
    pub reason: String,
}

impl RejectPayload {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.reason.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed(
                "a rejection reason is required".into(),
            ));
        }
        Ok(())
    }
}
