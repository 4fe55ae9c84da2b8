//! Artifacts under workflow control and the actors who move them
//!
//! An artifact is either the per-scope singleton Document (the Risk
//! Register itself) or an individual Item inside it. Both carry the same
//! approval-relevant fields and move through the same state machine; the
//! kind is a tag, not a specialization.

use crate::VersionNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for an artifact under workflow control
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub String);

impl ArtifactId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an acting user
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Artifact kind and status ─────────────────────────────────────────

/// Which workflow granularity an artifact belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// The singleton Risk Register document (one active per owning scope)
    Document,
    /// An individual risk item with its own independent workflow
    Item,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// Where an artifact sits in the approval lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ApprovalStatus {
    /// Editable; not yet submitted (or reverted to draft by a revision)
    #[default]
    Draft,
    /// Submitted, waiting on the first-level reviewer
    PendingFirstApproval,
    /// First approval granted, waiting on the second-level approver
    PendingSecondApproval,
    /// Fully approved baseline
    Approved,
    /// Sent back by a reviewer or approver; may be resubmitted
    Rejected,
}

impl ApprovalStatus {
    /// Check if the artifact is waiting on either approval level
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingFirstApproval | Self::PendingSecondApproval)
    }

    /// Check if the artifact may be submitted for review
    pub fn can_submit(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    /// Check if the artifact rests at a fully approved baseline
    pub fn is_terminal_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::PendingFirstApproval => "pending first approval",
            Self::PendingSecondApproval => "pending second approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{}", label)
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// The approval-relevant state of one artifact, as read by a caller.
///
/// The engine consumes a snapshot and returns a new one; it never reads
/// or writes storage itself. A stale snapshot (the trail has moved on)
/// makes every mutating operation fail with a concurrency conflict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSnapshot {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub version: VersionNumber,
    pub status: ApprovalStatus,
    /// Number of audit entries reflected in this snapshot. The
    /// optimistic-concurrency token: versions alone cannot distinguish
    /// a stale reader across version-preserving transitions (approvals,
    /// rejection), the entry count can.
    pub seq: u64,
    /// Identity assigned to perform first-level approval, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ActorId>,
    /// Identity assigned to perform second-level approval, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approver: Option<ActorId>,
    /// Present only in/after Rejected; cleared on the next submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_rejection_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ArtifactSnapshot {
    /// Create a fresh draft snapshot at version 1.0
    pub fn new_draft(id: ArtifactId, kind: ArtifactKind) -> Self {
        Self {
            id,
            kind,
            version: VersionNumber::initial(),
            status: ApprovalStatus::Draft,
            seq: 0,
            reviewer: None,
            approver: None,
            last_rejection_reason: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_reviewer(mut self, reviewer: ActorId) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    pub fn with_approver(mut self, approver: ActorId) -> Self {
        self.approver = Some(approver);
        self
    }
}

// ── Actors ───────────────────────────────────────────────────────────

/// A capability an actor holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capability {
    /// May edit artifacts: submit, start revisions, discard them
    Edit,
    /// Elevated override: may act in place of any assigned role
    GlobalAdmin,
}

/// The acting user, with their role label and capabilities.
///
/// The role label is denormalized into every audit entry the actor
/// produces, so the trail stays historically accurate even if the
/// actor's role later changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub id: ActorId,
    pub role_label: String,
    pub capabilities: Vec<Capability>,
}

impl ActorIdentity {
    pub fn new(id: impl Into<String>, role_label: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(id),
            role_label: role_label.into(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_draft_snapshot() {
        let snap = ArtifactSnapshot::new_draft(ArtifactId::new("doc-1"), ArtifactKind::Document);
        assert_eq!(snap.version, VersionNumber::initial());
        assert_eq!(snap.status, ApprovalStatus::Draft);
        assert_eq!(snap.seq, 0);
        assert!(snap.reviewer.is_none());
        assert!(snap.approver.is_none());
        assert!(snap.last_rejection_reason.is_none());
    }

    #[test]
    fn test_status_helpers() {
        assert!(ApprovalStatus::Draft.can_submit());
        assert!(ApprovalStatus::Rejected.can_submit());
        assert!(!ApprovalStatus::Approved.can_submit());
        assert!(ApprovalStatus::PendingFirstApproval.is_pending());
        assert!(ApprovalStatus::PendingSecondApproval.is_pending());
        assert!(!ApprovalStatus::Draft.is_pending());
        assert!(ApprovalStatus::Approved.is_terminal_approved());
        assert!(!ApprovalStatus::PendingSecondApproval.is_terminal_approved());
        assert!(!ApprovalStatus::Rejected.is_terminal_approved());
    }

    #[test]
    fn test_actor_capabilities() {
        let actor = ActorIdentity::new("u-1", "Compliance Officer")
            .with_capability(Capability::Edit);
        assert!(actor.has_capability(Capability::Edit));
        assert!(!actor.has_capability(Capability::GlobalAdmin));
    }

    #[test]
    fn test_artifact_id() {
        let id = ArtifactId::generate();
        assert!(!id.0.is_empty());
        assert!(id.short().len() <= 8);

        let named = ArtifactId::new("register-1");
        assert_eq!(format!("{}", named), "register-1");
    }

    #[test]
    fn test_snapshot_assignments() {
        let snap = ArtifactSnapshot::new_draft(ArtifactId::new("doc-1"), ArtifactKind::Document)
            .with_reviewer(ActorId::new("rev-1"))
            .with_approver(ActorId::new("app-1"));
        assert_eq!(snap.reviewer, Some(ActorId::new("rev-1")));
        assert_eq!(snap.approver, Some(ActorId::new("app-1")));
    }
}
