//! Approval Engine for RiskReg
//!
//! The versioned approval workflow engine: a two-level review pipeline
//! (Draft → PendingFirstApproval → PendingSecondApproval → Approved,
//! with Rejected and revision branches) over artifacts that carry an
//! explicit `(major, minor)` version and an append-only audit trail.
//!
//! # Key Concepts
//!
//! - **ApprovalStateMachine**: The pure transition table. Computes what
//!   a transition would do; never mutates anything.
//! - **WorkflowEngine**: The orchestrator callers invoke. Gates each
//!   request through the authorization policy, plans it through the
//!   state machine, then commits it as a single audit-trail append
//!   under optimistic concurrency.
//! - **TransitionOutcome**: The updated snapshot plus the appended
//!   entry, handed back for the external store to persist together.
//!
//! # Design Principles
//!
//! 1. No partial transitions. Every guard passes before the one
//!    mutation happens, or nothing is observable at all.
//! 2. One engine, two granularities. The Document and its Items run the
//!    same primitives, parameterized by artifact kind.
//! 3. A losing concurrent writer conflicts; it never overwrites.

#![deny(unsafe_code)]

mod engine;
mod state_machine;

pub use engine::*;
pub use state_machine::*;
