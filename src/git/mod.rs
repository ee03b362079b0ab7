//! # Repository Queries
//!
//! Everything git-town learns about branches and commits comes from
//! parsing `git` output. This module holds those parsers and the
//! components built on them:
//!
//! - [`SyncResolver`]: local vs. tracking branch comparisons
//! - [`SquashAuthorResolver`]: who a squash commit is attributed to
//! - [`branches`]: branch listings and the current branch
//! - [`remote`]: hostname and repository name from remote URLs
//! - [`Repository`]: the working tree the tool was started in

pub mod branches;
pub mod remote;
mod repository;
mod squash;
mod sync;

pub use remote::RemoteUrl;
pub use repository::{RepoError, Repository};
pub use squash::{
    choose_author, SquashAuthorResolver, SquashError, StdinInput, UserInput, AUTHOR_PROMPT,
};
pub use sync::{SyncError, SyncResolver};
