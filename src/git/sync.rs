//! Sync state between local branches and their tracking branches
//!
//! Nothing here is cached. Both sides can move outside this process (a
//! manual push, a colleague's push) so every predicate asks git again.
//! Two predicates called back to back may see different repository states.

use thiserror::Error;

use crate::domain::{tracking_branch_name, BranchName, SyncState, ORIGIN};
use crate::runner::{CommandRunner, RunnerError};
use crate::storage::{Hierarchy, HierarchyError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Unexpected output from '{command}': '{output}'")]
    Parse { command: String, output: String },

    #[error("No main branch configured. Run 'git-town main-branch <name>' first.")]
    NoMainBranch,
}

/// Answers sync questions about branches
#[derive(Debug, Clone)]
pub struct SyncResolver<R: CommandRunner> {
    hierarchy: Hierarchy<R>,
}

impl<R: CommandRunner> SyncResolver<R> {
    pub fn new(runner: R) -> Self {
        Self {
            hierarchy: Hierarchy::new(runner),
        }
    }

    fn runner(&self) -> &R {
        self.hierarchy.store().runner()
    }

    /// Runs a git query, failing on a non-zero exit
    fn query(&self, argv: &[&str]) -> Result<String, SyncError> {
        let output = self.runner().execute(argv)?;
        if !output.success() {
            return Err(SyncError::CommandFailed {
                command: argv.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// The remote counterpart of `local`; pure, no git call
    pub fn tracking_branch_name(local: &str) -> String {
        tracking_branch_name(local)
    }

    /// Returns true if `origin/<local>` exists among the remote branches
    pub fn has_tracking_branch(&self, local: &str) -> Result<bool, SyncError> {
        let tracking = tracking_branch_name(local);
        let output = self.runner().execute(&["git", "branch", "-r"])?;
        Ok(output.contains_line(&tracking))
    }

    /// Commit SHA a reference points to
    pub fn branch_sha(&self, reference: &str) -> Result<String, SyncError> {
        Ok(self
            .query(&["git", "rev-parse", reference])?
            .trim()
            .to_string())
    }

    /// Returns true if local and tracking branch point at the same commit.
    ///
    /// A branch without a tracking branch is in sync: there is nothing
    /// to be out of sync with.
    pub fn is_branch_in_sync(&self, local: &str) -> Result<bool, SyncError> {
        if !self.has_tracking_branch(local)? {
            return Ok(true);
        }
        let local_sha = self.branch_sha(local)?;
        let remote_sha = self.branch_sha(&tracking_branch_name(local))?;
        Ok(local_sha == remote_sha)
    }

    /// Returns true if the two sides differ by any commit, in either direction
    pub fn should_branch_be_pushed(&self, local: &str) -> Result<bool, SyncError> {
        let range = format!("{}...{}", local, tracking_branch_name(local));
        let output = self.query(&["git", "rev-list", "--left-right", &range])?;
        Ok(!output.trim().is_empty())
    }

    /// Returns true if `branch` has commits that are not on the main branch
    pub fn has_unmerged_commits(&self, branch: &str) -> Result<bool, SyncError> {
        let main = self.hierarchy.main_branch()?.ok_or(SyncError::NoMainBranch)?;
        let range = format!("{}..{}", main, branch);
        let output = self.query(&["git", "log", "--oneline", &range])?;
        Ok(!output.trim().is_empty())
    }

    /// Returns true if a branch with this name exists locally or on origin
    pub fn branch_exists(&self, name: &str) -> Result<bool, SyncError> {
        let remote_prefix = format!("remotes/{}/", ORIGIN);
        let output = self.runner().execute(&["git", "branch", "-a"])?;
        let found = output.lines().any(|line| {
            let line = line.trim_matches(|c| c == '*' || c == '+' || c == ' ');
            line.replacen(&remote_prefix, "", 1) == name
        });
        Ok(found)
    }

    /// Full classification of a branch against its tracking branch
    pub fn sync_state(&self, local: &BranchName) -> Result<SyncState, SyncError> {
        if !self.has_tracking_branch(local.as_str())? {
            return Ok(SyncState::NoTrackingBranch);
        }
        let tracking = local.tracking_name();
        if self.branch_sha(local.as_str())? == self.branch_sha(&tracking)? {
            return Ok(SyncState::InSync);
        }

        let range = format!("{}...{}", local, tracking);
        let argv = ["git", "rev-list", "--left-right", "--count", range.as_str()];
        let output = self.query(&argv)?;
        let parse_error = || SyncError::Parse {
            command: argv.join(" "),
            output: output.trim().to_string(),
        };
        let mut counts = output.split_whitespace().map(str::parse::<usize>);
        let ahead = counts.next().and_then(Result::ok).ok_or_else(parse_error)?;
        let behind = counts.next().and_then(Result::ok).ok_or_else(parse_error)?;
        Ok(SyncState::from_counts(ahead, behind))
    }
}
