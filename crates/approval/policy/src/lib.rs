//! Approval Policy - who may perform which transition
//!
//! Authorization is an ordered list of role checks per transition:
//! assigned-role match first, then the global-admin override, evaluated
//! uniformly rather than scattering admin special cases through guards.
//! The policy gates identity only; status gating belongs to the state
//! machine.

#![deny(unsafe_code)]

use approval_types::{
    ActorId, ActorIdentity, ArtifactSnapshot, Capability, Transition, WorkflowError,
    WorkflowResult,
};
use serde::{Deserialize, Serialize};

// ── Configuration ────────────────────────────────────────────────────

/// Configurable policy points left open by the workflow design
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    /// When true, final (second-level) approval applies a major version
    /// bump regardless of the bump chosen at submission
    pub final_approval_forces_major: bool,
    /// When true, the actor who granted first approval of the current
    /// cycle may not also grant second approval
    pub require_distinct_approvers: bool,
}

// ── Role checks ──────────────────────────────────────────────────────

/// One way an actor can qualify for a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleCheck {
    /// Holds the Edit capability on the artifact
    Editor,
    /// Is the artifact's assigned reviewer
    AssignedReviewer,
    /// Is the artifact's assigned approver
    AssignedApprover,
    /// Holds the GlobalAdmin override capability
    GlobalAdmin,
}

impl RoleCheck {
    fn satisfied_by(&self, actor: &ActorIdentity, snapshot: &ArtifactSnapshot) -> bool {
        match self {
            Self::Editor => actor.has_capability(Capability::Edit),
            Self::AssignedReviewer => snapshot.reviewer.as_ref() == Some(&actor.id),
            Self::AssignedApprover => snapshot.approver.as_ref() == Some(&actor.id),
            Self::GlobalAdmin => actor.has_capability(Capability::GlobalAdmin),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Editor => "an editor",
            Self::AssignedReviewer => "the assigned reviewer",
            Self::AssignedApprover => "the assigned approver",
            Self::GlobalAdmin => "a global admin",
        }
    }
}

// ── Policy ───────────────────────────────────────────────────────────

/// Pure authorization predicate over (actor, transition, artifact)
#[derive(Clone, Debug, Default)]
pub struct AuthorizationPolicy {
    config: PolicyConfig,
}

impl AuthorizationPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Policy with both open-question flags at their defaults
    pub fn with_defaults() -> Self {
        Self::new(PolicyConfig::default())
    }

    pub fn config(&self) -> PolicyConfig {
        self.config
    }

    /// The ordered role checks for a transition; satisfying any one is
    /// sufficient. Assigned roles come before the admin override so
    /// denial reasons name the expected role first.
    pub fn checks_for(transition: Transition) -> &'static [RoleCheck] {
        match transition {
            Transition::SubmitForReview
            | Transition::StartNewRevision
            | Transition::DiscardRevision => &[RoleCheck::Editor],
            Transition::FirstApproval => &[RoleCheck::AssignedReviewer, RoleCheck::GlobalAdmin],
            Transition::SecondApproval => &[RoleCheck::AssignedApprover, RoleCheck::GlobalAdmin],
            Transition::Reject => &[
                RoleCheck::AssignedReviewer,
                RoleCheck::AssignedApprover,
                RoleCheck::GlobalAdmin,
            ],
            Transition::AnnotateEntry => &[RoleCheck::GlobalAdmin],
        }
    }

    /// Decide whether `actor` may perform `transition` on the artifact.
    ///
    /// Denials carry a human-readable reason naming the qualifying roles.
    pub fn authorize(
        &self,
        actor: &ActorIdentity,
        transition: Transition,
        snapshot: &ArtifactSnapshot,
    ) -> WorkflowResult<()> {
        let checks = Self::checks_for(transition);
        if checks.iter().any(|c| c.satisfied_by(actor, snapshot)) {
            return Ok(());
        }
        Err(WorkflowError::Unauthorized(Self::denial_reason(
            transition, checks,
        )))
    }

    /// Authorize second approval, additionally enforcing the distinct-
    /// approvers rule when configured. `first_approver` is whoever
    /// granted first approval in the current pending cycle.
    pub fn authorize_final(
        &self,
        actor: &ActorIdentity,
        snapshot: &ArtifactSnapshot,
        first_approver: Option<&ActorId>,
    ) -> WorkflowResult<()> {
        self.authorize(actor, Transition::SecondApproval, snapshot)?;
        if self.config.require_distinct_approvers && first_approver == Some(&actor.id) {
            return Err(WorkflowError::Unauthorized(
                "second approval must come from a different individual than first approval"
                    .into(),
            ));
        }
        Ok(())
    }

    fn denial_reason(transition: Transition, checks: &[RoleCheck]) -> String {
        let roles: Vec<&str> = checks.iter().map(|c| c.describe()).collect();
        format!(
            "'{}' requires {}",
            transition,
            roles.join(" or ")
        )
    }
}
