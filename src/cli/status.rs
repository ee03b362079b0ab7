//! Repository state commands: status, branches, repo

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{BranchName, SyncState};
use crate::git::{branches, RemoteUrl, Repository};
use crate::runner::current_branch;

#[derive(Debug, Serialize)]
struct BranchStatus {
    branch: BranchName,
    kind: &'static str,
    parent: Option<BranchName>,
    sync_state: SyncState,
    should_push: bool,
    unmerged_commits: Option<bool>,
}

#[derive(Debug, Serialize)]
struct BranchRow {
    branch: BranchName,
    kind: &'static str,
    current: bool,
    tracking_gone: bool,
}

#[derive(Debug, Serialize)]
struct RepoInfo {
    root: String,
    origin_url: Option<String>,
    upstream_url: Option<String>,
    remote: Option<RemoteUrl>,
    offline: bool,
}

fn branch_kind(is_main: bool, is_perennial: bool) -> &'static str {
    if is_main {
        "main"
    } else if is_perennial {
        "perennial"
    } else {
        "feature"
    }
}

/// Sync state of one branch, the current one by default
pub fn status(output: &Output, branch: Option<&str>) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();
    let sync = repo.sync();

    let name = match branch {
        Some(name) => name.to_string(),
        None => current_branch(repo.runner())?,
    };
    let branch: BranchName = name
        .parse()
        .with_context(|| format!("Invalid branch name '{}'", name))?;

    let is_main = hierarchy.is_main_branch(branch.as_str())?;
    let is_perennial = hierarchy.is_perennial(branch.as_str())?;
    let sync_state = sync.sync_state(&branch)?;
    let should_push =
        sync_state != SyncState::NoTrackingBranch && sync.should_branch_be_pushed(branch.as_str())?;
    let unmerged_commits = match hierarchy.main_branch()? {
        Some(_) if !is_main => Some(sync.has_unmerged_commits(branch.as_str())?),
        _ => None,
    };

    let status = BranchStatus {
        parent: hierarchy.parent(&branch)?,
        kind: branch_kind(is_main, is_perennial),
        branch,
        sync_state,
        should_push,
        unmerged_commits,
    };

    if output.is_json() {
        output.data(&status);
        return Ok(());
    }

    output.row(&["Branch:", status.branch.as_str()]);
    output.row(&["Type:", status.kind]);
    if let Some(parent) = &status.parent {
        output.row(&["Parent:", parent.as_str()]);
    }
    output.row(&["Sync state:", status.sync_state.as_str()]);
    output.row(&["Needs push:", if status.should_push { "yes" } else { "no" }]);
    if let Some(unmerged) = status.unmerged_commits {
        output.row(&["Unmerged commits:", if unmerged { "yes" } else { "no" }]);
    }
    Ok(())
}

/// Lists local branches, main branch first
pub fn list_branches(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();
    let runner = repo.runner();

    let local = match hierarchy.main_branch()? {
        Some(main) => branches::local_branches_with_main_first(runner, &main)?,
        None => branches::local_branches(runner)?,
    };
    let gone = branches::branches_with_deleted_tracking(runner)?;
    let current = current_branch(runner)?;
    let perennials = hierarchy.perennial_branches()?;

    let mut rows = Vec::with_capacity(local.len());
    for branch in local {
        rows.push(BranchRow {
            kind: branch_kind(
                hierarchy.is_main_branch(branch.as_str())?,
                perennials.contains(&branch),
            ),
            current: branch == current.as_str(),
            tracking_gone: gone.contains(&branch),
            branch,
        });
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "branches": rows,
            "previous": branches::previously_checked_out_branch(runner)?,
        }));
        return Ok(());
    }

    for row in &rows {
        let marker = if row.current { "*" } else { " " };
        let gone = if row.tracking_gone { "[gone]" } else { "" };
        output.line(
            format!("{} {:<30} {:<10} {}", marker, row.branch, row.kind, gone).trim_end(),
        );
    }
    Ok(())
}

/// Shows where the repository lives and where it pushes to
pub fn repo_info(output: &Output, test_mode: bool) -> Result<()> {
    let repo = Repository::open_current()?;
    let settings = repo.settings();

    let non_empty = |url: String| if url.is_empty() { None } else { Some(url) };
    let origin_url = non_empty(settings.remote_origin_url(test_mode)?);
    let upstream_url = non_empty(settings.remote_upstream_url()?);

    let info = RepoInfo {
        root: repo.root().display().to_string(),
        remote: origin_url.as_deref().and_then(RemoteUrl::parse),
        origin_url,
        upstream_url,
        offline: settings.is_offline()?,
    };

    if output.is_json() {
        output.data(&info);
        return Ok(());
    }

    output.row(&["Root:", &info.root]);
    output.row(&["Origin:", info.origin_url.as_deref().unwrap_or("[none]")]);
    if let Some(remote) = &info.remote {
        output.row(&["Host:", &remote.hostname]);
        output.row(&["Repository:", &remote.repository]);
    }
    if let Some(upstream) = &info.upstream_url {
        output.row(&["Upstream:", upstream]);
    }
    output.row(&["Offline:", &info.offline.to_string()]);
    Ok(())
}
