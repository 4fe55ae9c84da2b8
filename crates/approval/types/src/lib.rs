//! Approval Domain Types for RiskReg
//!
//! Shared value types for the versioned approval workflow: the artifacts
//! under workflow control, their `(major, minor)` versions, the audit
//! entries that record every transition, and the error taxonomy callers
//! branch on.
//!
//! # Key Concepts
//!
//! - **ArtifactSnapshot**: The approval-relevant state of one artifact —
//!   the singleton Document or an individual Item — as read by a caller.
//! - **VersionNumber**: An explicit `(major, minor)` pair. Never a float;
//!   repeated `+0.1` bumps must land on exact tenths.
//! - **AuditEntry**: One immutable record of a workflow transition,
//!   carrying the version the artifact had *after* the transition.
//! - **ActorIdentity**: Who is acting, with their capabilities and the
//!   role label denormalized into every entry they produce.
//!
//! # Design Principles
//!
//! 1. The engine is generic over artifact kind. Document and Item flows
//!    share one state machine and one version arithmetic.
//! 2. Every successful transition appends exactly one audit entry.
//! 3. Failed transitions have zero side effects. No partial states.

#![deny(unsafe_code)]

mod artifact;
mod audit;
mod errors;
mod request;
mod version;

pub use artifact::*;
pub use audit::*;
pub use errors::*;
pub use request::*;
pub use version::*;
