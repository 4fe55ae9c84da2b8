//! Audit entries: the immutable record of every workflow transition
//!
//! One entry per successful transition, carrying the version the
//! artifact had after the transition and the actor's role label frozen
//! at the time of the action.

use crate::{ActorId, ArtifactId, VersionNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an audit entry
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuditEntryId(pub String);

impl AuditEntryId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AuditEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The workflow action an audit entry records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// Artifact drafted (creation, or a new revision opened)
    DraftAndReview,
    /// Submitted for first-level review
    SubmittedForReview,
    /// First-level approval granted
    FirstLevelApproval,
    /// Second-level (final) approval granted
    SecondLevelApproval,
    /// Content updated without a workflow transition
    Updation,
    /// Sent back by a reviewer or approver
    Rejected,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::DraftAndReview => "draft and review",
            Self::SubmittedForReview => "submitted for review",
            Self::FirstLevelApproval => "first level approval",
            Self::SecondLevelApproval => "second level approval",
            Self::Updation => "updation",
            Self::Rejected => "rejected",
        };
        write!(f, "{}", label)
    }
}

/// One immutable record of a workflow transition.
///
/// Entries are append-only. The single sanctioned exception is a
/// post-hoc correction of `change_description` by an authorized actor,
/// which never touches version or action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub artifact_id: ArtifactId,
    /// The version the artifact had *after* this entry was applied
    pub version: VersionNumber,
    pub action: AuditAction,
    pub change_description: String,
    pub actor: ActorId,
    /// Role label frozen at action time, for historical accuracy
    pub actor_role_label: String,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        artifact_id: ArtifactId,
        version: VersionNumber,
        action: AuditAction,
        change_description: impl Into<String>,
        actor: ActorId,
        actor_role_label: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditEntryId::generate(),
            artifact_id,
            version,
            action,
            change_description: change_description.into(),
            actor,
            actor_role_label: actor_role_label.into(),
            created_at: Utc::now(),
        }
    }
}
