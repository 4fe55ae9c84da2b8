//! Workflow engine: the orchestrator callers invoke
//!
//! Composes the authorization policy, the state machine, version
//! arithmetic, and the audit trail into atomic operations. The order is
//! fixed per call: policy gate, then transition plan, then the trail
//! append under optimistic concurrency, then the updated snapshot. Any
//! failure short-circuits before the append, so a failed call has zero
//! side effects.
//!
//! The engine never performs I/O. It hands the caller the new snapshot
//! and the freshly appended entry for an external store to commit
//! together.

use crate::{ApprovalStateMachine, TransitionPlan};
use approval_policy::AuthorizationPolicy;
use approval_trail::AuditTrail;
use approval_types::{
    ActorIdentity, ApprovalStatus, ArtifactId, ArtifactKind, ArtifactSnapshot, AuditAction,
    AuditEntry, AuditEntryId, Capability, RejectPayload, RevisionPayload, SubmitPayload,
    Transition, WorkflowError, WorkflowResult,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// The result of a successful transition: the state to persist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub snapshot: ArtifactSnapshot,
    pub entry: AuditEntry,
}

/// The result of a discard: the reverted snapshot and the erased history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscardOutcome {
    pub snapshot: ArtifactSnapshot,
    pub removed: Vec<AuditEntry>,
}

/// Orchestrates approval transitions for one scope.
///
/// Instantiated once per owning scope; the Document and its Items run
/// through the same engine with the same primitives. Artifacts contend
/// only on their own id — the trail serializes per artifact.
pub struct WorkflowEngine {
    policy: AuthorizationPolicy,
    machine: ApprovalStateMachine,
    trail: AuditTrail,
    /// The scope's singleton Document, once created
    document: RwLock<Option<ArtifactId>>,
}

impl WorkflowEngine {
    pub fn new(policy: AuthorizationPolicy) -> Self {
        Self {
            policy,
            machine: ApprovalStateMachine::new(),
            trail: AuditTrail::new(),
            document: RwLock::new(None),
        }
    }

    /// Engine with the default policy configuration
    pub fn with_defaults() -> Self {
        Self::new(AuthorizationPolicy::with_defaults())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create a new artifact in Draft at version 1.0, seeding its trail
    /// with the creation entry.
    ///
    /// The Document is a per-scope singleton: a second Document-kind
    /// create on the same engine fails. Items are unlimited.
    pub fn create_artifact(
        &self,
        id: ArtifactId,
        kind: ArtifactKind,
        actor: &ActorIdentity,
        description: impl Into<String>,
    ) -> WorkflowResult<TransitionOutcome> {
        if !actor.has_capability(Capability::Edit) {
            return Err(WorkflowError::Unauthorized(
                "creating an artifact requires an editor".into(),
            ));
        }
        let mut snapshot = ArtifactSnapshot::new_draft(id, kind);
        let entry = AuditEntry::new(
            snapshot.id.clone(),
            snapshot.version,
            AuditAction::DraftAndReview,
            description,
            actor.id.clone(),
            actor.role_label.clone(),
        );
        if kind == ArtifactKind::Document {
            // Held across the trail seed so two racing Document creates
            // cannot both pass the singleton check.
            let mut document = self
                .document
                .write()
                .map_err(|_| WorkflowError::StorePoisoned)?;
            if let Some(existing) = document.as_ref() {
                return Err(WorkflowError::ValidationFailed(format!(
                    "this scope already has a document: {}",
                    existing
                )));
            }
            self.trail.record_creation(entry.clone())?;
            *document = Some(snapshot.id.clone());
        } else {
            self.trail.record_creation(entry.clone())?;
        }
        snapshot.seq = 1;
        tracing::info!(artifact = %snapshot.id, kind = %kind, "artifact created");
        Ok(TransitionOutcome { snapshot, entry })
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Submit a draft or rejected artifact for first-level review.
    /// Clears any lingering rejection reason.
    pub fn submit_for_review(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
        payload: &SubmitPayload,
    ) -> WorkflowResult<TransitionOutcome> {
        self.policy
            .authorize(actor, Transition::SubmitForReview, snapshot)?;
        let plan = self.machine.plan_submit(snapshot, payload)?;
        let mut outcome = self.apply(snapshot, actor, plan)?;
        outcome.snapshot.last_rejection_reason = None;
        Ok(outcome)
    }

    /// First-level approval: pending-first to pending-second
    pub fn first_approval(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
    ) -> WorkflowResult<TransitionOutcome> {
        self.policy
            .authorize(actor, Transition::FirstApproval, snapshot)?;
        let plan = self.machine.plan_first_approval(snapshot)?;
        self.apply(snapshot, actor, plan)
    }

    /// Second-level (final) approval: pending-second to approved.
    /// Applies the force-major policy when configured, and the
    /// distinct-approvers rule against whoever granted first approval.
    pub fn second_approval(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
    ) -> WorkflowResult<TransitionOutcome> {
        let first_approver = self
            .trail
            .entries(&snapshot.id)?
            .iter()
            .rev()
            .find(|e| e.action == AuditAction::FirstLevelApproval)
            .map(|e| e.actor.clone());
        self.policy
            .authorize_final(actor, snapshot, first_approver.as_ref())?;
        let plan = self
            .machine
            .plan_second_approval(snapshot, self.policy.config().final_approval_forces_major)?;
        self.apply(snapshot, actor, plan)
    }

    /// Reject a pending artifact, recording the reason on the snapshot
    pub fn reject(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
        payload: &RejectPayload,
    ) -> WorkflowResult<TransitionOutcome> {
        self.policy.authorize(actor, Transition::Reject, snapshot)?;
        let plan = self.machine.plan_reject(snapshot, payload)?;
        let mut outcome = self.apply(snapshot, actor, plan)?;
        outcome.snapshot.last_rejection_reason = Some(payload.reason.clone());
        Ok(outcome)
    }

    /// Open a new revision of an approved artifact, back to Draft at a
    /// bumped version
    pub fn start_new_revision(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
        payload: &RevisionPayload,
    ) -> WorkflowResult<TransitionOutcome> {
        self.policy
            .authorize(actor, Transition::StartNewRevision, snapshot)?;
        let plan = self.machine.plan_revision(snapshot, payload)?;
        self.apply(snapshot, actor, plan)
    }

    /// Abandon an unsubmitted revision, reverting to the last approved
    /// baseline and erasing only the trailing draft history.
    pub fn discard_revision(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
    ) -> WorkflowResult<DiscardOutcome> {
        self.policy
            .authorize(actor, Transition::DiscardRevision, snapshot)?;
        self.machine.check_discardable(snapshot)?;

        let baseline = self
            .trail
            .entries(&snapshot.id)?
            .iter()
            .rev()
            .find(|e| e.action == AuditAction::SecondLevelApproval)
            .map(|e| e.version)
            .ok_or_else(|| {
                WorkflowError::NoDiscardableRevision(
                    "no approved baseline to revert to".into(),
                )
            })?;

        // The trail checks the snapshot seq under its write lock, so a
        // stale snapshot conflicts instead of discarding someone else's
        // work.
        let removed = self
            .trail
            .discard_trailing_draft(&snapshot.id, snapshot.seq, baseline)?;

        let mut next = snapshot.clone();
        next.status = ApprovalStatus::Approved;
        next.version = baseline;
        next.seq = snapshot.seq - removed.len() as u64;
        next.updated_at = Utc::now();
        tracing::info!(
            artifact = %snapshot.id,
            actor = %actor.id,
            baseline = %baseline,
            "revision discarded"
        );
        Ok(DiscardOutcome {
            snapshot: next,
            removed,
        })
    }

    // ── Annotation and reads ─────────────────────────────────────────

    /// Correct the description of an existing audit entry. Not a
    /// transition: version and action are untouched.
    pub fn annotate_entry(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
        entry_id: &AuditEntryId,
        new_description: impl Into<String>,
    ) -> WorkflowResult<AuditEntry> {
        self.policy
            .authorize(actor, Transition::AnnotateEntry, snapshot)?;
        self.trail.annotate(&snapshot.id, entry_id, new_description)
    }

    /// The full ordered audit history for an artifact, for presentation
    /// and export collaborators
    pub fn history(&self, artifact: &ArtifactId) -> WorkflowResult<Vec<AuditEntry>> {
        self.trail.entries(artifact)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Append the planned entry and build the updated snapshot. The
    /// append is the single mutation; it carries the optimistic
    /// concurrency check against the caller's snapshot version.
    fn apply(
        &self,
        snapshot: &ArtifactSnapshot,
        actor: &ActorIdentity,
        plan: TransitionPlan,
    ) -> WorkflowResult<TransitionOutcome> {
        let entry = AuditEntry::new(
            snapshot.id.clone(),
            plan.next_version,
            plan.action,
            plan.description,
            actor.id.clone(),
            actor.role_label.clone(),
        );
        self.trail.append(snapshot.seq, entry.clone())?;

        let mut next = snapshot.clone();
        next.status = plan.next_status;
        next.version = plan.next_version;
        next.seq = snapshot.seq + 1;
        next.updated_at = Utc::now();
        tracing::info!(
            artifact = %next.id,
            actor = %actor.id,
            action = %entry.action,
            version = %next.version,
            status = %next.status,
            "transition applied"
        );
        Ok(TransitionOutcome {
            snapshot: next,
            entry,
        })
    }
}
