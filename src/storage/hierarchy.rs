//! Branch hierarchy stored in git config
//!
//! Each feature branch records its `parent`. The `ancestors` entry is a
//! cache of the parent chain, root first, excluding both the perennial
//! branch at the top and the branch itself. Reads never re-walk the
//! chain; callers that need a fresh one use [`Hierarchy::refresh_ancestors`].
//!
//! Any change to a recorded parent clears every ancestor cache, since a
//! moved branch changes the chain of all its descendants.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::config::{ConfigError, ConfigStore, Scope};
use super::keys::{self, BranchField};
use crate::domain::{BranchName, BranchTree};
use crate::runner::CommandRunner;

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Branch hierarchy contains a cycle: {}", format_chain(.0))]
    Cycle(Vec<BranchName>),
}

fn format_chain(chain: &[BranchName]) -> String {
    chain
        .iter()
        .map(BranchName::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// State of a branch's ancestor cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncestorCache {
    /// Never computed, or cleared since
    Missing,
    /// Stored chain; may be empty for a direct child of a perennial branch
    Cached(Vec<BranchName>),
}

/// Parent/child/ancestor view over git config
#[derive(Debug, Clone)]
pub struct Hierarchy<R: CommandRunner> {
    store: ConfigStore<R>,
}

impl<R: CommandRunner> Hierarchy<R> {
    pub fn new(runner: R) -> Self {
        Self {
            store: ConfigStore::new(runner),
        }
    }

    pub fn store(&self) -> &ConfigStore<R> {
        &self.store
    }

    // --- main and perennial branches -------------------------------------

    /// The configured main branch, if any
    pub fn main_branch(&self) -> Result<Option<BranchName>, HierarchyError> {
        self.read_branch(keys::MAIN_BRANCH)
    }

    pub fn set_main_branch(&self, branch: &BranchName) -> Result<(), HierarchyError> {
        self.store
            .set(keys::MAIN_BRANCH, branch.as_str(), Scope::Local)?;
        Ok(())
    }

    pub fn is_main_branch(&self, branch: &str) -> Result<bool, HierarchyError> {
        Ok(self.main_branch()?.is_some_and(|main| main == branch))
    }

    /// Perennial branches in stored order
    pub fn perennial_branches(&self) -> Result<Vec<BranchName>, HierarchyError> {
        self.read_list(keys::PERENNIAL_BRANCHES)
    }

    pub fn set_perennial_branches(&self, branches: &[BranchName]) -> Result<(), HierarchyError> {
        self.store.set(
            keys::PERENNIAL_BRANCHES,
            &BranchName::join_list(branches),
            Scope::Local,
        )?;
        Ok(())
    }

    /// Adds a perennial branch, returning false if it already was one
    pub fn add_perennial_branch(&self, branch: &BranchName) -> Result<bool, HierarchyError> {
        let mut branches = self.perennial_branches()?;
        if branches.contains(branch) {
            return Ok(false);
        }
        branches.push(branch.clone());
        self.set_perennial_branches(&branches)?;
        Ok(true)
    }

    pub fn is_perennial(&self, branch: &str) -> Result<bool, HierarchyError> {
        Ok(self.perennial_branches()?.iter().any(|p| p == branch))
    }

    /// Neither the main branch nor perennial
    pub fn is_feature_branch(&self, branch: &str) -> Result<bool, HierarchyError> {
        Ok(!self.is_main_branch(branch)? && !self.is_perennial(branch)?)
    }

    // --- parents ---------------------------------------------------------

    pub fn parent(&self, branch: &BranchName) -> Result<Option<BranchName>, HierarchyError> {
        self.read_branch(&BranchField::Parent.key(branch.as_str()))
    }

    /// Records `parent` as the parent of `branch`.
    ///
    /// No cycle check happens here; [`Hierarchy::compute_ancestors`]
    /// reports cycles when it meets one.
    pub fn set_parent(&self, branch: &BranchName, parent: &BranchName) -> Result<(), HierarchyError> {
        let previous = self.parent(branch)?;
        self.store.set(
            &BranchField::Parent.key(branch.as_str()),
            parent.as_str(),
            Scope::Local,
        )?;
        if previous.as_ref() != Some(parent) {
            self.invalidate_ancestors(branch)?;
        }
        Ok(())
    }

    pub fn delete_parent(&self, branch: &BranchName) -> Result<(), HierarchyError> {
        if self.parent(branch)?.is_none() {
            return Ok(());
        }
        self.store.unset(&BranchField::Parent.key(branch.as_str()))?;
        self.invalidate_ancestors(branch)
    }

    /// Every `(child, parent)` pair, in git's key order
    pub fn parent_entries(&self) -> Result<Vec<(BranchName, BranchName)>, HierarchyError> {
        let field = BranchField::Parent;
        let mut entries = Vec::new();
        for key in self
            .store
            .keys_matching(Scope::Local, |k| field.branch_of(k).is_some())?
        {
            let Some(child) = field.branch_of(&key) else {
                continue;
            };
            let child = parse_branch(&key, child)?;
            if let Some(parent) = self.read_branch(&key)? {
                entries.push((child, parent));
            }
        }
        Ok(entries)
    }

    /// Branches whose parent is `branch`, sorted by name
    pub fn children(&self, branch: &BranchName) -> Result<Vec<BranchName>, HierarchyError> {
        let mut children: Vec<_> = self
            .parent_entries()?
            .into_iter()
            .filter(|(_, parent)| parent == branch)
            .map(|(child, _)| child)
            .collect();
        children.sort();
        Ok(children)
    }

    /// The full hierarchy as a graph
    pub fn tree(&self) -> Result<BranchTree, HierarchyError> {
        Ok(BranchTree::from_parents(self.parent_entries()?))
    }

    // --- ancestor cache --------------------------------------------------

    /// The cached ancestor chain, empty when never computed.
    ///
    /// This may be stale; it is not checked against the parents.
    pub fn ancestors(&self, branch: &BranchName) -> Result<Vec<BranchName>, HierarchyError> {
        self.read_list(&BranchField::Ancestors.key(branch.as_str()))
    }

    /// The cached chain, telling "never computed" apart from "empty"
    pub fn ancestor_cache(&self, branch: &BranchName) -> Result<AncestorCache, HierarchyError> {
        let key = BranchField::Ancestors.key(branch.as_str());
        if !self.store.has(&key, Scope::Local)? {
            return Ok(AncestorCache::Missing);
        }
        Ok(AncestorCache::Cached(self.read_list(&key)?))
    }

    /// Overwrites the cache; `chain` must already be root first
    pub fn set_ancestors(&self, branch: &BranchName, chain: &[BranchName]) -> Result<(), HierarchyError> {
        self.store.set(
            &BranchField::Ancestors.key(branch.as_str()),
            &BranchName::join_list(chain),
            Scope::Local,
        )?;
        Ok(())
    }

    /// True if a non-empty chain is cached
    pub fn has_cached_ancestors(&self, branch: &BranchName) -> Result<bool, HierarchyError> {
        Ok(!self.ancestors(branch)?.is_empty())
    }

    /// Clears the ancestor cache of every branch, returning how many were set
    pub fn delete_all_ancestor_caches(&self) -> Result<usize, HierarchyError> {
        let field = BranchField::Ancestors;
        let keys = self
            .store
            .keys_matching(Scope::Local, |k| field.branch_of(k).is_some())?;
        for key in &keys {
            self.store.unset(key)?;
        }
        Ok(keys.len())
    }

    /// Walks parent pointers up from `branch`.
    ///
    /// Stops below the first main or perennial branch, or at a branch
    /// without a parent. The result is root first and excludes `branch`.
    pub fn compute_ancestors(&self, branch: &BranchName) -> Result<Vec<BranchName>, HierarchyError> {
        let main = self.main_branch()?;
        let perennials = self.perennial_branches()?;
        let is_root = |b: &BranchName| main.as_ref() == Some(b) || perennials.contains(b);

        let mut chain = Vec::new();
        let mut seen = HashSet::from([branch.clone()]);
        let mut current = branch.clone();

        while let Some(parent) = self.parent(&current)? {
            if is_root(&parent) {
                break;
            }
            if !seen.insert(parent.clone()) {
                let mut cycle = vec![branch.clone()];
                cycle.extend(chain.iter().cloned());
                cycle.push(parent);
                return Err(HierarchyError::Cycle(cycle));
            }
            chain.push(parent.clone());
            current = parent;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Recomputes the chain for `branch` and stores it
    pub fn refresh_ancestors(&self, branch: &BranchName) -> Result<Vec<BranchName>, HierarchyError> {
        let chain = self.compute_ancestors(branch)?;
        self.set_ancestors(branch, &chain)?;
        Ok(chain)
    }

    // --- wholesale -------------------------------------------------------

    /// Removes every git-town setting and branch entry from the repository
    pub fn remove_all_configuration(&self) -> Result<usize, HierarchyError> {
        let mut removed = usize::from(self.store.remove_section(keys::SECTION)?);
        for key in self.store.keys_matching(Scope::Local, keys::is_git_town_key)? {
            self.store.unset(&key)?;
            removed += 1;
        }
        Ok(removed)
    }

    fn invalidate_ancestors(&self, changed: &BranchName) -> Result<(), HierarchyError> {
        let cleared = self.delete_all_ancestor_caches()?;
        debug!(branch = %changed, cleared, "Parent changed, cleared ancestor caches");
        Ok(())
    }

    fn read_branch(&self, key: &str) -> Result<Option<BranchName>, HierarchyError> {
        let value = self.store.get(key, Some(Scope::Local))?;
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_branch(key, &value)?))
    }

    fn read_list(&self, key: &str) -> Result<Vec<BranchName>, HierarchyError> {
        let value = self.store.get(key, Some(Scope::Local))?;
        BranchName::parse_list(&value).map_err(|source| {
            ConfigError::BranchName {
                key: key.to_string(),
                source,
            }
            .into()
        })
    }
}

fn parse_branch(key: &str, value: &str) -> Result<BranchName, HierarchyError> {
    value.parse().map_err(|source| {
        ConfigError::BranchName {
            key: key.to_string(),
            source,
        }
        .into()
    })
}
