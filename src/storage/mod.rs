//! # Storage Layer
//!
//! git-town keeps all of its state in the repository's git configuration,
//! so it travels with the repository and needs no files of its own.
//!
//! ## Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`ConfigStore`] | Untyped get/set/unset/list over `git config` |
//! | [`Hierarchy`] | Parents, children, ancestor caches, main and perennial branches |
//! | [`Settings`] | Pull strategy, offline mode, hack-push flag, remote URLs |
//!
//! ## Consistency
//!
//! Every write is its own `git config` call. A crash between two writes
//! leaves each entry valid on its own, but a sequence of writes is not
//! atomic. Nothing is locked; two processes editing one repository's
//! configuration at once is unsupported.

mod config;
mod hierarchy;
pub mod keys;
mod settings;

pub use config::{ConfigError, ConfigStore, Scope};
pub use hierarchy::{AncestorCache, Hierarchy, HierarchyError};
pub use settings::{ConfigSnapshot, PullBranchStrategy, Settings};
