//! Relationship between a local branch and its tracking branch

use serde::Serialize;
use std::fmt;

/// How a branch compares to its `origin/` counterpart.
///
/// Derived fresh from git on every query, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Both point at the same commit
    InSync,
    /// Local has commits the remote lacks
    NeedsPush,
    /// Remote has commits the local branch lacks
    NeedsPull,
    /// Both sides have commits the other lacks
    Diverged,
    /// There is no `origin/<branch>`
    NoTrackingBranch,
}

impl SyncState {
    /// Classifies a left/right commit count (`local...origin/local`)
    pub fn from_counts(ahead: usize, behind: usize) -> Self {
        match (ahead, behind) {
            (0, 0) => SyncState::InSync,
            (_, 0) => SyncState::NeedsPush,
            (0, _) => SyncState::NeedsPull,
            _ => SyncState::Diverged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::InSync => "in sync",
            SyncState::NeedsPush => "needs push",
            SyncState::NeedsPull => "needs pull",
            SyncState::Diverged => "diverged",
            SyncState::NoTrackingBranch => "no tracking branch",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_counts() {
        assert_eq!(SyncState::from_counts(0, 0), SyncState::InSync);
        assert_eq!(SyncState::from_counts(2, 0), SyncState::NeedsPush);
        assert_eq!(SyncState::from_counts(0, 3), SyncState::NeedsPull);
        assert_eq!(SyncState::from_counts(1, 1), SyncState::Diverged);
    }

    #[test]
    fn displays_as_phrase() {
        assert_eq!(SyncState::NoTrackingBranch.to_string(), "no tracking branch");
        assert_eq!(SyncState::Diverged.to_string(), "diverged");
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SyncState::NeedsPush).unwrap();
        assert_eq!(json, "\"needs_push\"");
    }
}
