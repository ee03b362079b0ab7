//! Domain models for git-town
//!
//! Contains the branch vocabulary without any I/O concerns.

mod author;
mod branch;
mod graph;
mod sync_state;

pub use author::{parse_selection, parse_shortlog, pluralize, Author, AuthorError};
pub use branch::{tracking_branch_name, BranchName, BranchNameError, ORIGIN};
pub use graph::{BranchTree, TreeLine};
pub use sync_state::SyncState;
