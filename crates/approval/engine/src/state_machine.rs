//! State machine: the approval transition table and its guards
//!
//! Pure planning only. Each `plan_*` method checks the source status and
//! the payload guard, then returns the next status, the post-transition
//! version, and the audit action to record. Nothing here mutates state;
//! a failed plan leaves the caller with exactly what it started with.

use approval_types::{
    ApprovalStatus, ArtifactSnapshot, AuditAction, BumpKind, RejectPayload, RevisionPayload,
    SubmitPayload, VersionNumber, WorkflowError, WorkflowResult,
};

/// What a successful transition will do, computed before any mutation
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionPlan {
    pub next_status: ApprovalStatus,
    pub next_version: VersionNumber,
    pub action: AuditAction,
    /// Free text recorded in the audit entry
    pub description: String,
}

/// The approval transition table, artifact-kind-agnostic
#[derive(Clone, Copy, Debug, Default)]
pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Draft | Rejected → PendingFirstApproval, bumping per the payload
    pub fn plan_submit(
        &self,
        snapshot: &ArtifactSnapshot,
        payload: &SubmitPayload,
    ) -> WorkflowResult<TransitionPlan> {
        if !snapshot.status.can_submit() {
            return Err(WorkflowError::InvalidTransition(format!(
                "cannot submit from '{}'",
                snapshot.status
            )));
        }
        payload.validate()?;
        Ok(TransitionPlan {
            next_status: ApprovalStatus::PendingFirstApproval,
            next_version: snapshot.version.bump(payload.bump),
            action: AuditAction::SubmittedForReview,
            description: payload.description.clone(),
        })
    }

    /// PendingFirstApproval → PendingSecondApproval; version stands
    pub fn plan_first_approval(
        &self,
        snapshot: &ArtifactSnapshot,
    ) -> WorkflowResult<TransitionPlan> {
        if snapshot.status != ApprovalStatus::PendingFirstApproval {
            return Err(WorkflowError::InvalidTransition(format!(
                "first approval requires pending first approval, found '{}'",
                snapshot.status
            )));
        }
        Ok(TransitionPlan {
            next_status: ApprovalStatus::PendingSecondApproval,
            next_version: snapshot.version,
            action: AuditAction::FirstLevelApproval,
            description: "first level approval granted".into(),
        })
    }

    /// PendingSecondApproval → Approved.
    ///
    /// By default the version stands as submitted; when `force_major` is
    /// set (a policy configuration point), final approval applies a
    /// major bump.
    pub fn plan_second_approval(
        &self,
        snapshot: &ArtifactSnapshot,
        force_major: bool,
    ) -> WorkflowResult<TransitionPlan> {
        if snapshot.status != ApprovalStatus::PendingSecondApproval {
            return Err(WorkflowError::InvalidTransition(format!(
                "second approval requires pending second approval, found '{}'",
                snapshot.status
            )));
        }
        let next_version = if force_major {
            snapshot.version.bump(BumpKind::Major)
        } else {
            snapshot.version
        };
        Ok(TransitionPlan {
            next_status: ApprovalStatus::Approved,
            next_version,
            action: AuditAction::SecondLevelApproval,
            description: "second level approval granted".into(),
        })
    }

    /// Either pending state → Rejected; version stands
    pub fn plan_reject(
        &self,
        snapshot: &ArtifactSnapshot,
        payload: &RejectPayload,
    ) -> WorkflowResult<TransitionPlan> {
        if !snapshot.status.is_pending() {
            return Err(WorkflowError::InvalidTransition(format!(
                "only a pending artifact can be rejected, found '{}'",
                snapshot.status
            )));
        }
        payload.validate()?;
        Ok(TransitionPlan {
            next_status: ApprovalStatus::Rejected,
            next_version: snapshot.version,
            action: AuditAction::Rejected,
            description: payload.reason.clone(),
        })
    }

    /// Approved → Draft, opening a new revision at a bumped version
    pub fn plan_revision(
        &self,
        snapshot: &ArtifactSnapshot,
        payload: &RevisionPayload,
    ) -> WorkflowResult<TransitionPlan> {
        if !snapshot.status.is_terminal_approved() {
            return Err(WorkflowError::InvalidTransition(format!(
                "a new revision requires an approved baseline, found '{}'",
                snapshot.status
            )));
        }
        payload.validate()?;
        Ok(TransitionPlan {
            next_status: ApprovalStatus::Draft,
            next_version: snapshot.version.bump(payload.bump),
            action: AuditAction::DraftAndReview,
            description: payload.description.clone(),
        })
    }

    /// Guard for discard: only an in-progress draft can be thrown away.
    /// The trail enforces the rest of the precondition (nothing has been
    /// submitted on top of the draft, and a baseline exists).
    pub fn check_discardable(&self, snapshot: &ArtifactSnapshot) -> WorkflowResult<()> {
        if snapshot.status != ApprovalStatus::Draft {
            return Err(WorkflowError::NoDiscardableRevision(format!(
                "only a draft revision can be discarded, found '{}'",
                snapshot.status
            )));
        }
        Ok(())
    }
}
