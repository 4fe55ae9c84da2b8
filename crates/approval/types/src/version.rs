//! Version numbers: explicit `(major, minor)` pairs
//!
//! Versions are integer pairs, never floats. The display form is
//! `"major.minor"`, and ordering is lexicographic on the pair, so
//! `2.0 > 1.9` and repeated minor bumps stay on exact tenths.

use serde::{Deserialize, Serialize};

/// A document or item version as an explicit `(major, minor)` pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
}

impl VersionNumber {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The version a freshly created artifact carries: `1.0`
    pub fn initial() -> Self {
        Self { major: 1, minor: 0 }
    }

    /// Apply a version bump, returning the new version.
    ///
    /// `None` is the identity; `Minor` increments the minor component;
    /// `Major` increments the major component and resets minor to 0.
    pub fn bump(self, kind: BumpKind) -> Self {
        match kind {
            BumpKind::None => self,
            BumpKind::Minor => Self {
                major: self.major,
                minor: self.minor + 1,
            },
            BumpKind::Major => Self {
                major: self.major + 1,
                minor: 0,
            },
        }
    }
}

impl std::fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The version effect a transition requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BumpKind {
    /// Keep the version as-is
    #[default]
    None,
    /// Increment the minor component
    Minor,
    /// Increment the major component, resetting minor to 0
    Major,
}
