//! git-town - Branch hierarchy and sync workflows on top of git
//!
//! Feature branches record their parent branch in the repository's git
//! configuration. From that hierarchy, and from what git reports about
//! local and remote branches, git-town derives ancestor chains, sync
//! states and squash-commit authors.

pub mod cli;
pub mod domain;
pub mod git;
pub mod logging;
pub mod runner;
pub mod storage;

pub use domain::{Author, BranchName, SyncState};
pub use git::{Repository, SquashAuthorResolver, SyncResolver};
pub use runner::{CommandRunner, SystemRunner};
pub use storage::{ConfigStore, Hierarchy, Settings};
