//! Branch hierarchy CLI commands

use anyhow::{bail, Context, Result};
use tracing::warn;

use super::output::Output;
use crate::domain::BranchName;
use crate::git::Repository;
use crate::storage::AncestorCache;

fn parse_branch(name: &str) -> Result<BranchName> {
    name.parse()
        .with_context(|| format!("Invalid branch name '{}'", name))
}

/// Shows, sets or removes the parent of a branch
pub fn parent(output: &Output, branch: &str, parent: Option<&str>, remove: bool) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();
    let branch = parse_branch(branch)?;

    if remove {
        hierarchy.delete_parent(&branch)?;
        output.success(&format!("Removed parent of '{}'", branch));
        return Ok(());
    }

    let Some(parent) = parent else {
        let parent = hierarchy.parent(&branch)?;
        if output.is_json() {
            output.data(&serde_json::json!({ "branch": branch, "parent": parent }));
        } else {
            output.line(parent.as_ref().map_or("[none]", BranchName::as_str));
        }
        return Ok(());
    };

    let parent = parse_branch(parent)?;
    if parent == branch {
        bail!("A branch cannot be its own parent");
    }
    if !hierarchy.is_feature_branch(branch.as_str())? {
        bail!("'{}' is the main branch or perennial and has no parent", branch);
    }
    hierarchy.set_parent(&branch, &parent)?;
    output.success(&format!("Parent of '{}' set to '{}'", branch, parent));
    Ok(())
}

/// Lists the direct children of a branch
pub fn children(output: &Output, branch: &str) -> Result<()> {
    let repo = Repository::open_current()?;
    let branch = parse_branch(branch)?;
    let children = repo.hierarchy().children(&branch)?;

    if output.is_json() {
        output.data(&children);
    } else if children.is_empty() {
        output.line("[none]");
    } else {
        for child in &children {
            output.line(child.as_str());
        }
    }
    Ok(())
}

/// Shows the cached ancestor chain, or recomputes it with `compute`
pub fn ancestors(output: &Output, branch: &str, compute: bool) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();
    let branch = parse_branch(branch)?;

    let cache = if compute {
        AncestorCache::Cached(hierarchy.refresh_ancestors(&branch)?)
    } else {
        hierarchy.ancestor_cache(&branch)?
    };

    match (&cache, output.is_json()) {
        (AncestorCache::Missing, true) => {
            output.data(&serde_json::json!({ "branch": branch, "ancestors": null }))
        }
        (AncestorCache::Cached(chain), true) => {
            output.data(&serde_json::json!({ "branch": branch, "ancestors": chain }))
        }
        (AncestorCache::Missing, false) => {
            output.line("[not computed] run with --compute to compute it")
        }
        (AncestorCache::Cached(chain), false) if chain.is_empty() => output.line("[none]"),
        (AncestorCache::Cached(chain), false) => output.line(&BranchName::join_list(chain)),
    }
    Ok(())
}

/// Clears every ancestor cache
pub fn clear_ancestors(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let cleared = repo.hierarchy().delete_all_ancestor_caches()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "success": true, "cleared": cleared }));
    } else {
        output.success(&format!("Cleared {} ancestor cache(s)", cleared));
    }
    Ok(())
}

/// Prints the whole hierarchy as an indented tree
pub fn tree(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let tree = repo.hierarchy().tree()?;

    if tree.has_cycle() {
        warn!("Branch hierarchy contains a cycle; branches in it are not shown");
    }

    let lines = tree.walk();
    if output.is_json() {
        output.data(&lines);
    } else if lines.is_empty() {
        output.line("No branch has a recorded parent.");
    } else {
        for line in &lines {
            output.line(&format!("{}{}", "  ".repeat(line.depth), line.branch));
        }
    }
    Ok(())
}
