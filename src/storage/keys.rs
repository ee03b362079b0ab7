//! The git-config key namespace
//!
//! These names are shared with every repository already configured for
//! git-town and must not change.
//!
//! | Key | Value |
//! |-----|-------|
//! | `git-town.main-branch-name` | branch name |
//! | `git-town.perennial-branch-names` | space-separated branch names |
//! | `git-town.offline` | `true` / `false` (global) |
//! | `git-town.hack-push-flag` | `true` / `false` |
//! | `git-town.pull-branch-strategy` | `rebase` / `merge` |
//! | `git-town.testing.remote-url` | remote URL override in test mode |
//! | `git-town-branch.<name>.parent` | branch name |
//! | `git-town-branch.<name>.ancestors` | space-separated, root first |

/// Section holding repository-wide settings
pub const SECTION: &str = "git-town";

/// Section holding per-branch entries
pub const BRANCH_SECTION: &str = "git-town-branch";

pub const MAIN_BRANCH: &str = "git-town.main-branch-name";
pub const PERENNIAL_BRANCHES: &str = "git-town.perennial-branch-names";
pub const OFFLINE: &str = "git-town.offline";
pub const HACK_PUSH: &str = "git-town.hack-push-flag";
pub const PULL_BRANCH_STRATEGY: &str = "git-town.pull-branch-strategy";
pub const TESTING_REMOTE_URL: &str = "git-town.testing.remote-url";

/// A per-branch field, stored as `git-town-branch.<name>.<field>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchField {
    Parent,
    Ancestors,
}

impl BranchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchField::Parent => "parent",
            BranchField::Ancestors => "ancestors",
        }
    }

    /// The config key holding this field for `branch`
    pub fn key(&self, branch: &str) -> String {
        format!("{}.{}.{}", BRANCH_SECTION, branch, self.as_str())
    }

    /// The branch a key of this field belongs to, if it is one
    pub fn branch_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        let branch = key
            .strip_prefix(BRANCH_SECTION)?
            .strip_prefix('.')?
            .strip_suffix(self.as_str())?
            .strip_suffix('.')?;
        if branch.is_empty() {
            None
        } else {
            Some(branch)
        }
    }
}

/// Returns true if the key belongs to git-town at all
pub fn is_git_town_key(key: &str) -> bool {
    key.starts_with(&format!("{}.", SECTION)) || key.starts_with(&format!("{}.", BRANCH_SECTION))
}
