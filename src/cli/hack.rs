//! `hack`: create a feature branch off a parent

use anyhow::{bail, Context, Result};

use super::output::Output;
use crate::domain::{BranchName, ORIGIN};
use crate::git::{branches, Repository};
use crate::runner::{CommandRunner, Script};
use crate::storage::{keys::BranchField, PullBranchStrategy};

pub const DRY_RUN_MESSAGE: &str = "\
In dry run mode. No commands will be run. When run in normal mode, the command
output will appear beneath the command. Some commands will only be run if
necessary. For example: 'git push' will run if and only if there are local
commits not on the remote.";

/// Prints a step's header and runs it
fn step<R: CommandRunner>(output: &Output, script: &mut Script<R>, argv: &[&str]) -> Result<()> {
    output.step(&script.describe(argv));
    script.run(argv)?;
    Ok(())
}

pub fn hack(output: &Output, branch: &str, parent: Option<&str>, dry_run: bool) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();
    let settings = repo.settings();
    let sync = repo.sync();

    let branch: BranchName = branch
        .parse()
        .with_context(|| format!("Invalid branch name '{}'", branch))?;
    let parent: BranchName = match parent {
        Some(name) => name
            .parse()
            .with_context(|| format!("Invalid branch name '{}'", name))?,
        None => hierarchy.main_branch()?.context(
            "No main branch configured. Run 'git-town main-branch <name>' first.",
        )?,
    };
    if sync.branch_exists(branch.as_str())? {
        bail!("A branch named '{}' already exists", branch);
    }

    let online = !settings.is_offline()? && branches::has_remote(repo.runner(), ORIGIN)?;
    let push = online && settings.should_hack_push()?;
    let strategy = settings.pull_branch_strategy()?;

    let mut script = repo.script(dry_run)?;
    if dry_run && output.is_text() {
        output.line(DRY_RUN_MESSAGE);
    }

    if online {
        step(output, &mut script, &["git", "fetch", "--prune", ORIGIN])?;
    }
    step(output, &mut script, &["git", "checkout", parent.as_str()])?;
    if online && sync.has_tracking_branch(parent.as_str())? {
        let tracking = parent.tracking_name();
        match strategy {
            PullBranchStrategy::Rebase => {
                step(output, &mut script, &["git", "rebase", &tracking])?
            }
            PullBranchStrategy::Merge => {
                step(output, &mut script, &["git", "merge", "--no-edit", &tracking])?
            }
        }
    }
    step(output, &mut script, &["git", "branch", branch.as_str(), parent.as_str()])?;
    step(output, &mut script, &["git", "checkout", branch.as_str()])?;

    // Written through the hierarchy, not the script; skipped in dry run
    let parent_key = BranchField::Parent.key(branch.as_str());
    output.step(&script.describe(&["git", "config", &parent_key, parent.as_str()]));
    if !script.is_dry_run() {
        hierarchy.set_parent(&branch, &parent)?;
        hierarchy.refresh_ancestors(&branch)?;
    }

    if push {
        step(output, &mut script, &["git", "push", "-u", ORIGIN, branch.as_str()])?;
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "branch": branch,
            "parent": parent,
            "pushed": push && !dry_run,
            "dry_run": dry_run,
        }));
    } else if dry_run {
        output.line("");
        output.line(DRY_RUN_MESSAGE);
    } else {
        output.line("");
        output.success(&format!(
            "Created '{}' off '{}'{}",
            branch,
            parent,
            if push { " and pushed it" } else { "" }
        ));
    }
    Ok(())
}
