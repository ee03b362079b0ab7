//! Configuration CLI commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::BranchName;
use crate::git::{branches, Repository};
use crate::storage::{ConfigSnapshot, PullBranchStrategy};

#[derive(Subcommand)]
pub enum PerennialCommands {
    /// List perennial branches
    List,

    /// Mark branches as perennial
    Add {
        /// Branch names
        #[arg(required = true)]
        branches: Vec<String>,
    },

    /// Replace the perennial branch list
    Set {
        /// Branch names (none clears the list)
        branches: Vec<String>,
    },
}

fn parse_branch(name: &str) -> Result<BranchName> {
    name.parse()
        .with_context(|| format!("Invalid branch name '{}'", name))
}

fn require_local_branch(repo: &Repository, branch: &BranchName) -> Result<()> {
    let local = branches::local_branches(repo.runner())?;
    if !local.contains(branch) {
        bail!("There is no branch named '{}'", branch);
    }
    Ok(())
}

/// Shows everything git-town has configured
pub fn show(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let snapshot = ConfigSnapshot::load(&repo.hierarchy(), &repo.settings())?;

    if output.is_json() {
        output.data(&snapshot);
        return Ok(());
    }

    let main = snapshot
        .main_branch
        .as_ref()
        .map(BranchName::to_string)
        .unwrap_or_else(|| "[none]".to_string());
    let perennials = if snapshot.perennial_branches.is_empty() {
        "[none]".to_string()
    } else {
        BranchName::join_list(&snapshot.perennial_branches)
    };
    output.row(&["Main branch:", &main]);
    output.row(&["Perennial branches:", &perennials]);
    output.row(&["Pull branch strategy:", snapshot.pull_branch_strategy.as_str()]);
    output.row(&["Offline:", &snapshot.offline.to_string()]);
    output.row(&["Hack push:", &snapshot.hack_push.to_string()]);
    Ok(())
}

/// Shows or sets the main branch
pub fn main_branch(output: &Output, branch: Option<&str>) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();

    let Some(name) = branch else {
        match hierarchy.main_branch()? {
            Some(main) if output.is_json() => output.data(&serde_json::json!({ "main_branch": main })),
            Some(main) => output.line(main.as_str()),
            None if output.is_json() => output.data(&serde_json::json!({ "main_branch": null })),
            None => output.line("[none]"),
        }
        return Ok(());
    };

    let branch = parse_branch(name)?;
    require_local_branch(&repo, &branch)?;
    hierarchy.set_main_branch(&branch)?;
    output.success(&format!("Main branch set to '{}'", branch));
    Ok(())
}

pub fn perennial(cmd: PerennialCommands, output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let hierarchy = repo.hierarchy();

    match cmd {
        PerennialCommands::List => {
            let perennials = hierarchy.perennial_branches()?;
            if output.is_json() {
                output.data(&perennials);
            } else if perennials.is_empty() {
                output.line("[none]");
            } else {
                for branch in &perennials {
                    output.line(branch.as_str());
                }
            }
        }

        PerennialCommands::Add { branches } => {
            for name in &branches {
                let branch = parse_branch(name)?;
                if hierarchy.is_main_branch(branch.as_str())? {
                    bail!("'{}' is the main branch and cannot be perennial", branch);
                }
                require_local_branch(&repo, &branch)?;
                if hierarchy.add_perennial_branch(&branch)? {
                    output.success(&format!("Added '{}' to perennial branches", branch));
                } else {
                    output.success(&format!("'{}' is already a perennial branch", branch));
                }
            }
        }

        PerennialCommands::Set { branches } => {
            let branches = branches
                .iter()
                .map(|name| parse_branch(name))
                .collect::<Result<Vec<_>>>()?;
            for branch in &branches {
                if hierarchy.is_main_branch(branch.as_str())? {
                    bail!("'{}' is the main branch and cannot be perennial", branch);
                }
            }
            hierarchy.set_perennial_branches(&branches)?;
            output.success(&format!(
                "Perennial branches set to: {}",
                BranchName::join_list(&branches)
            ));
        }
    }

    Ok(())
}

/// Shows or sets offline mode
pub fn offline(output: &Output, value: Option<bool>) -> Result<()> {
    let repo = Repository::open_current()?;
    let settings = repo.settings();

    match value {
        Some(offline) => {
            settings.set_offline(offline)?;
            output.success(&format!("Offline mode {}", if offline { "enabled" } else { "disabled" }));
        }
        None if output.is_json() => {
            output.data(&serde_json::json!({ "offline": settings.is_offline()? }))
        }
        None => output.line(&settings.is_offline()?.to_string()),
    }
    Ok(())
}

/// Shows or sets whether `hack` pushes new branches
pub fn hack_push_flag(output: &Output, value: Option<bool>) -> Result<()> {
    let repo = Repository::open_current()?;
    let settings = repo.settings();

    match value {
        Some(push) => {
            settings.set_hack_push(push)?;
            output.success(&format!("Hack push flag set to {}", push));
        }
        None if output.is_json() => {
            output.data(&serde_json::json!({ "hack_push": settings.should_hack_push()? }))
        }
        None => output.line(&settings.should_hack_push()?.to_string()),
    }
    Ok(())
}

/// Shows or sets the pull branch strategy
pub fn pull_branch_strategy(output: &Output, value: Option<PullBranchStrategy>) -> Result<()> {
    let repo = Repository::open_current()?;
    let settings = repo.settings();

    match value {
        Some(strategy) => {
            settings.set_pull_branch_strategy(strategy)?;
            output.success(&format!("Pull branch strategy set to {}", strategy));
        }
        None if output.is_json() => output.data(
            &serde_json::json!({ "pull_branch_strategy": settings.pull_branch_strategy()? }),
        ),
        None => output.line(settings.pull_branch_strategy()?.as_str()),
    }
    Ok(())
}

/// Removes all git-town configuration from the repository
pub fn reset(output: &Output) -> Result<()> {
    let repo = Repository::open_current()?;
    let removed = repo.hierarchy().remove_all_configuration()?;

    if output.is_json() {
        output.data(&serde_json::json!({ "success": true, "removed": removed }));
    } else {
        output.success("Removed all git-town configuration");
    }
    Ok(())
}
