//! Approval Trail - append-only audit log per artifact
//!
//! The trail is the system of record for workflow history and the
//! serialization point for optimistic concurrency: every append checks
//! the caller's snapshot sequence (the entry count it last saw) against
//! the stored trail, so of two writers racing on the same snapshot
//! exactly one wins. Versions alone cannot carry that check, since the
//! approval and rejection transitions keep the version unchanged.
//!
//! History is never rewritten, with one narrowly guarded exception:
//! `discard_trailing_draft` removes the trailing entries of a revision
//! that was opened but never submitted, reverting to the last approved
//! baseline. It is a distinct named operation, not a generic delete.

#![deny(unsafe_code)]

use approval_types::{
    ArtifactId, AuditAction, AuditEntry, AuditEntryId, VersionNumber, WorkflowError,
    WorkflowResult,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// Append-only audit log, keyed by artifact id
pub struct AuditTrail {
    entries: RwLock<HashMap<ArtifactId, Vec<AuditEntry>>>,
}

impl AuditTrail {
    /// Create an empty trail store
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the trail for a newly created artifact.
    ///
    /// Writes the initial `DraftAndReview` entry. Fails if the artifact
    /// already has history.
    pub fn record_creation(&self, entry: AuditEntry) -> WorkflowResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        if entries
            .get(&entry.artifact_id)
            .is_some_and(|list| !list.is_empty())
        {
            return Err(WorkflowError::ValidationFailed(format!(
                "artifact {} already has an audit trail",
                entry.artifact_id
            )));
        }
        entries.insert(entry.artifact_id.clone(), vec![entry]);
        Ok(())
    }

    /// Append an entry, enforcing optimistic concurrency.
    ///
    /// `snapshot_seq` is the entry count the caller's snapshot reflects.
    /// If the trail has grown past it, the caller lost a race and gets
    /// `ConcurrencyConflict`; it must re-read and retry, never overwrite.
    pub fn append(&self, snapshot_seq: u64, entry: AuditEntry) -> WorkflowResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        let list = entries.entry(entry.artifact_id.clone()).or_default();

        let current_seq = list.len() as u64;
        if current_seq != snapshot_seq {
            tracing::warn!(
                artifact = %entry.artifact_id,
                snapshot_seq,
                trail_seq = current_seq,
                "audit append lost optimistic concurrency race"
            );
            return Err(WorkflowError::ConcurrencyConflict {
                expected: snapshot_seq,
                found: current_seq,
            });
        }

        // Versions are monotonically non-decreasing; anything else means
        // the trail itself is damaged, not that the caller raced.
        if let Some(last) = list.last() {
            if entry.version < last.version {
                return Err(WorkflowError::CorruptTrail(format!(
                    "entry version {} precedes trail version {} for artifact {}",
                    entry.version, last.version, entry.artifact_id
                )));
            }
        }

        list.push(entry);
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The most recent entry for an artifact, if any
    pub fn latest(&self, artifact: &ArtifactId) -> WorkflowResult<Option<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        Ok(entries.get(artifact).and_then(|list| list.last().cloned()))
    }

    /// The number of entries recorded for an artifact — the concurrency
    /// token a fresh snapshot should carry
    pub fn seq(&self, artifact: &ArtifactId) -> WorkflowResult<u64> {
        let entries = self
            .entries
            .read()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        Ok(entries.get(artifact).map(|l| l.len() as u64).unwrap_or(0))
    }

    /// All entries for an artifact, in append order
    pub fn entries(&self, artifact: &ArtifactId) -> WorkflowResult<Vec<AuditEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        Ok(entries.get(artifact).cloned().unwrap_or_default())
    }

    /// Entries recorded at exactly the given version
    pub fn entries_for_version(
        &self,
        artifact: &ArtifactId,
        version: VersionNumber,
    ) -> WorkflowResult<Vec<AuditEntry>> {
        Ok(self
            .entries(artifact)?
            .into_iter()
            .filter(|e| e.version == version)
            .collect())
    }

    /// Entries recorded strictly after the given version
    pub fn entries_newer_than(
        &self,
        artifact: &ArtifactId,
        version: VersionNumber,
    ) -> WorkflowResult<Vec<AuditEntry>> {
        Ok(self
            .entries(artifact)?
            .into_iter()
            .filter(|e| e.version > version)
            .collect())
    }

    // ── Discard ──────────────────────────────────────────────────────

    /// Check the discard precondition without mutating anything.
    ///
    /// A trailing draft is discardable only when the latest entry is a
    /// `DraftAndReview` (nothing has been submitted on top of it) and at
    /// least one entry survives at or below the baseline.
    pub fn can_discard(
        &self,
        artifact: &ArtifactId,
        baseline: VersionNumber,
    ) -> WorkflowResult<()> {
        let entries = self
            .entries
            .read()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        Self::check_discard(entries.get(artifact), baseline)
    }

    /// Remove every entry strictly newer than the baseline, all or
    /// nothing. Returns the removed entries (newest last).
    ///
    /// `snapshot_seq` is checked against the trail under the same write
    /// lock as the removal, so a writer racing the discard surfaces as
    /// `ConcurrencyConflict`, not as a precondition failure.
    pub fn discard_trailing_draft(
        &self,
        artifact: &ArtifactId,
        snapshot_seq: u64,
        baseline: VersionNumber,
    ) -> WorkflowResult<Vec<AuditEntry>> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WorkflowError::StorePoisoned)?;

        let current_seq = entries.get(artifact).map(|l| l.len() as u64).unwrap_or(0);
        if current_seq != snapshot_seq {
            return Err(WorkflowError::ConcurrencyConflict {
                expected: snapshot_seq,
                found: current_seq,
            });
        }
        Self::check_discard(entries.get(artifact), baseline)?;

        let list = entries
            .get_mut(artifact)
            .ok_or_else(|| WorkflowError::NoDiscardableRevision("no audit trail".into()))?;
        let keep = list.iter().filter(|e| e.version <= baseline).count();
        let removed = list.split_off(keep);
        tracing::info!(
            artifact = %artifact,
            baseline = %baseline,
            removed = removed.len(),
            "discarded trailing draft entries"
        );
        Ok(removed)
    }

    fn check_discard(list: Option<&Vec<AuditEntry>>, baseline: VersionNumber) -> WorkflowResult<()> {
        let (list, latest) = match list.and_then(|l| l.last().map(|e| (l, e))) {
            Some(pair) => pair,
            None => {
                return Err(WorkflowError::NoDiscardableRevision(
                    "artifact has no audit trail".into(),
                ))
            }
        };
        if latest.action != AuditAction::DraftAndReview {
            return Err(WorkflowError::NoDiscardableRevision(format!(
                "latest entry is '{}', not an unsubmitted draft",
                latest.action
            )));
        }
        if latest.version <= baseline {
            return Err(WorkflowError::NoDiscardableRevision(
                "nothing newer than the baseline to discard".into(),
            ));
        }
        if !list.iter().any(|e| e.version <= baseline) {
            return Err(WorkflowError::NoDiscardableRevision(
                "no entry at or below the baseline to revert to".into(),
            ));
        }
        Ok(())
    }

    // ── Annotation ───────────────────────────────────────────────────

    /// Correct the free-text description of an existing entry.
    ///
    /// A pure annotation edit: version, action, actor, and timestamp are
    /// untouched. Returns the corrected entry.
    pub fn annotate(
        &self,
        artifact: &ArtifactId,
        entry_id: &AuditEntryId,
        new_description: impl Into<String>,
    ) -> WorkflowResult<AuditEntry> {
        let new_description = new_description.into();
        if new_description.trim().is_empty() {
            return Err(WorkflowError::ValidationFailed(
                "annotation must not be empty".into(),
            ));
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WorkflowError::StorePoisoned)?;
        let list = entries.get_mut(artifact).ok_or_else(|| {
            WorkflowError::ValidationFailed(format!("artifact {} has no audit trail", artifact))
        })?;
        let entry = list.iter_mut().find(|e| &e.id == entry_id).ok_or_else(|| {
            WorkflowError::ValidationFailed(format!("audit entry {} not found", entry_id))
        })?;
        entry.change_description = new_description;
        Ok(entry.clone())
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_types::ActorId;

    fn doc() -> ArtifactId {
        ArtifactId::new("doc-1")
    }

    fn make_entry(version: VersionNumber, action: AuditAction) -> AuditEntry {
        AuditEntry::new(
            doc(),
            version,
            action,
            "entry",
            ActorId::new("u-1"),
            "Risk Manager",
        )
    }

    fn seeded_trail() -> AuditTrail {
        let trail = AuditTrail::new();
        trail
            .record_creation(make_entry(
                VersionNumber::initial(),
                AuditAction::DraftAndReview,
            ))
            .unwrap();
        trail
    }

    #[test]
    fn test_record_creation_once() {
        let trail = seeded_trail();
        let err = trail
            .record_creation(make_entry(
                VersionNumber::initial(),
                AuditAction::DraftAndReview,
            ))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ValidationFailed(_)));
    }

    #[test]
    fn test_append_and_query() {
        let trail = seeded_trail();
        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::SubmittedForReview),
            )
            .unwrap();

        let latest = trail.latest(&doc()).unwrap().unwrap();
        assert_eq!(latest.version, VersionNumber::new(1, 1));
        assert_eq!(latest.action, AuditAction::SubmittedForReview);

        assert_eq!(trail.entries(&doc()).unwrap().len(), 2);
        assert_eq!(
            trail
                .entries_for_version(&doc(), VersionNumber::new(1, 1))
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            trail
                .entries_newer_than(&doc(), VersionNumber::new(1, 0))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_append_stale_snapshot_conflicts() {
        let trail = seeded_trail();
        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::SubmittedForReview),
            )
            .unwrap();

        // A second writer still holding the sequence-1 snapshot loses
        // the race, even though both entries carry the same version.
        let err = trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::FirstLevelApproval),
            )
            .unwrap_err();
        match err {
            WorkflowError::ConcurrencyConflict { expected, found } => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_append_rejects_version_regression() {
        let trail = seeded_trail();
        trail
            .append(
                1,
                make_entry(VersionNumber::new(2, 0), AuditAction::SubmittedForReview),
            )
            .unwrap();

        let err = trail
            .append(
                2,
                make_entry(VersionNumber::new(1, 5), AuditAction::Rejected),
            )
            .unwrap_err();
        assert!(matches!(err, WorkflowError::CorruptTrail(_)));
    }

    #[test]
    fn test_discard_trailing_draft() {
        let trail = seeded_trail();
        // Approved baseline at 1.1, then a revision draft at 1.2.
        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::SubmittedForReview),
            )
            .unwrap();
        trail
            .append(
                2,
                make_entry(VersionNumber::new(1, 1), AuditAction::SecondLevelApproval),
            )
            .unwrap();
        trail
            .append(
                3,
                make_entry(VersionNumber::new(1, 2), AuditAction::DraftAndReview),
            )
            .unwrap();

        trail.can_discard(&doc(), VersionNumber::new(1, 1)).unwrap();
        let removed = trail
            .discard_trailing_draft(&doc(), 4, VersionNumber::new(1, 1))
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].version, VersionNumber::new(1, 2));

        // The 1.2 entry is gone; the trail ends at the baseline.
        let latest = trail.latest(&doc()).unwrap().unwrap();
        assert_eq!(latest.version, VersionNumber::new(1, 1));
        assert!(trail
            .entries_for_version(&doc(), VersionNumber::new(1, 2))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_discard_blocked_after_submission() {
        let trail = seeded_trail();
        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::DraftAndReview),
            )
            .unwrap();
        trail
            .append(
                2,
                make_entry(VersionNumber::new(1, 2), AuditAction::SubmittedForReview),
            )
            .unwrap();

        let err = trail
            .discard_trailing_draft(&doc(), 3, VersionNumber::new(1, 0))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoDiscardableRevision(_)));
    }

    #[test]
    fn test_discard_with_stale_seq_conflicts() {
        let trail = seeded_trail();
        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::SecondLevelApproval),
            )
            .unwrap();
        trail
            .append(
                2,
                make_entry(VersionNumber::new(1, 2), AuditAction::DraftAndReview),
            )
            .unwrap();

        // A caller still holding the pre-append snapshot must be told to
        // re-read, even though the discard precondition happens to hold.
        let err = trail
            .discard_trailing_draft(&doc(), 2, VersionNumber::new(1, 1))
            .unwrap_err();
        match err {
            WorkflowError::ConcurrencyConflict { expected, found } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_discard_needs_a_baseline_entry() {
        let trail = AuditTrail::new();
        trail
            .record_creation(make_entry(
                VersionNumber::new(2, 0),
                AuditAction::DraftAndReview,
            ))
            .unwrap();

        // Only entry is above the requested baseline; nothing to revert to.
        let err = trail
            .discard_trailing_draft(&doc(), 1, VersionNumber::new(1, 0))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoDiscardableRevision(_)));
    }

    #[test]
    fn test_discard_with_nothing_newer() {
        let trail = seeded_trail();
        let err = trail
            .discard_trailing_draft(&doc(), 1, VersionNumber::new(1, 0))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NoDiscardableRevision(_)));
    }

    #[test]
    fn test_annotate_preserves_version_and_action() {
        let trail = seeded_trail();
        let original = trail.latest(&doc()).unwrap().unwrap();

        let corrected = trail
            .annotate(&doc(), &original.id, "created the 2026 register")
            .unwrap();
        assert_eq!(corrected.change_description, "created the 2026 register");
        assert_eq!(corrected.version, original.version);
        assert_eq!(corrected.action, original.action);
        assert_eq!(corrected.created_at, original.created_at);
    }

    #[test]
    fn test_annotate_rejects_empty_text() {
        let trail = seeded_trail();
        let entry = trail.latest(&doc()).unwrap().unwrap();
        let err = trail.annotate(&doc(), &entry.id, "  ").unwrap_err();
        assert!(matches!(err, WorkflowError::ValidationFailed(_)));
    }

    #[test]
    fn test_independent_artifacts_do_not_interfere() {
        let trail = AuditTrail::new();
        let item = ArtifactId::new("item-1");
        trail
            .record_creation(make_entry(
                VersionNumber::initial(),
                AuditAction::DraftAndReview,
            ))
            .unwrap();
        trail
            .record_creation(AuditEntry::new(
                item.clone(),
                VersionNumber::initial(),
                AuditAction::DraftAndReview,
                "entry",
                ActorId::new("u-2"),
                "Analyst",
            ))
            .unwrap();

        trail
            .append(
                1,
                make_entry(VersionNumber::new(1, 1), AuditAction::SubmittedForReview),
            )
            .unwrap();

        // The item's trail is untouched by document appends.
        assert_eq!(trail.entries(&item).unwrap().len(), 1);
        assert_eq!(trail.seq(&item).unwrap(), 1);
        assert_eq!(trail.seq(&doc()).unwrap(), 2);
    }
}
