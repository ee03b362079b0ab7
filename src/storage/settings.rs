//! Typed git-town settings
//!
//! Offline mode is a per-user preference and lives in the global scope.
//! Everything else is per repository.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::config::{parse_flag, ConfigError, ConfigStore, Scope};
use super::hierarchy::{Hierarchy, HierarchyError};
use super::keys;
use crate::domain::BranchName;
use crate::runner::CommandRunner;

/// How `sync` brings a branch up to date with its tracking branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PullBranchStrategy {
    #[default]
    Rebase,
    Merge,
}

impl PullBranchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullBranchStrategy::Rebase => "rebase",
            PullBranchStrategy::Merge => "merge",
        }
    }
}

impl fmt::Display for PullBranchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullBranchStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rebase" => Ok(PullBranchStrategy::Rebase),
            "merge" => Ok(PullBranchStrategy::Merge),
            other => Err(ConfigError::InvalidValue {
                key: keys::PULL_BRANCH_STRATEGY.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Typed access to the non-hierarchy settings
#[derive(Debug, Clone)]
pub struct Settings<R: CommandRunner> {
    store: ConfigStore<R>,
}

impl<R: CommandRunner> Settings<R> {
    pub fn new(runner: R) -> Self {
        Self {
            store: ConfigStore::new(runner),
        }
    }

    pub fn pull_branch_strategy(&self) -> Result<PullBranchStrategy, ConfigError> {
        let value = self.store.get(keys::PULL_BRANCH_STRATEGY, Some(Scope::Local))?;
        if value.is_empty() {
            return Ok(PullBranchStrategy::default());
        }
        value.parse()
    }

    pub fn set_pull_branch_strategy(&self, strategy: PullBranchStrategy) -> Result<(), ConfigError> {
        self.store
            .set(keys::PULL_BRANCH_STRATEGY, strategy.as_str(), Scope::Local)
    }

    /// Offline mode skips every network operation; off unless set
    pub fn is_offline(&self) -> Result<bool, ConfigError> {
        let value = self.store.get_or(keys::OFFLINE, "false")?;
        parse_flag(keys::OFFLINE, &value)
    }

    pub fn set_offline(&self, offline: bool) -> Result<(), ConfigError> {
        self.store
            .set(keys::OFFLINE, &offline.to_string(), Scope::Global)
    }

    /// Whether `hack` pushes new branches to origin; on unless set
    pub fn should_hack_push(&self) -> Result<bool, ConfigError> {
        let value = self.store.get_or(keys::HACK_PUSH, "true")?;
        parse_flag(keys::HACK_PUSH, &value)
    }

    pub fn set_hack_push(&self, push: bool) -> Result<(), ConfigError> {
        self.store
            .set(keys::HACK_PUSH, &push.to_string(), Scope::Local)
    }

    /// URL of the `origin` remote, empty when there is none.
    ///
    /// In test mode a stored `git-town.testing.remote-url` takes precedence.
    pub fn remote_origin_url(&self, test_mode: bool) -> Result<String, ConfigError> {
        if test_mode {
            let mocked = self.store.get(keys::TESTING_REMOTE_URL, Some(Scope::Local))?;
            if !mocked.is_empty() {
                return Ok(mocked);
            }
        }
        self.remote_url("origin")
    }

    /// URL of the `upstream` remote, empty when there is none
    pub fn remote_upstream_url(&self) -> Result<String, ConfigError> {
        self.remote_url("upstream")
    }

    fn remote_url(&self, remote: &str) -> Result<String, ConfigError> {
        let output = self
            .store
            .runner()
            .execute(&["git", "remote", "get-url", remote])?;
        if !output.success() {
            return Ok(String::new());
        }
        Ok(output.text().to_string())
    }
}

/// Everything git-town has configured for a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub main_branch: Option<BranchName>,
    pub perennial_branches: Vec<BranchName>,
    pub pull_branch_strategy: PullBranchStrategy,
    pub offline: bool,
    pub hack_push: bool,
}

impl ConfigSnapshot {
    pub fn load<R: CommandRunner>(
        hierarchy: &Hierarchy<R>,
        settings: &Settings<R>,
    ) -> Result<Self, HierarchyError> {
        Ok(Self {
            main_branch: hierarchy.main_branch()?,
            perennial_branches: hierarchy.perennial_branches()?,
            pull_branch_strategy: settings.pull_branch_strategy()?,
            offline: settings.is_offline()?,
            hack_push: settings.should_hack_push()?,
        })
    }
}
