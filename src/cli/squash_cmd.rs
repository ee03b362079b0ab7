//! `squash-author`: pick the author for squashing a branch

use std::io;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::BranchName;
use crate::git::{Repository, StdinInput};
use crate::runner::current_branch;

pub fn squash_author(output: &Output, branch: Option<&str>) -> Result<()> {
    let repo = Repository::open_current()?;

    let name = match branch {
        Some(name) => name.to_string(),
        None => current_branch(repo.runner())?,
    };
    let branch: BranchName = name
        .parse()
        .with_context(|| format!("Invalid branch name '{}'", name))?;

    // Prompts go to stderr so stdout carries only the answer
    let author = repo
        .squash_authors()
        .resolve(&branch, &mut StdinInput, &mut io::stderr())?;

    if output.is_json() {
        output.data(&serde_json::json!({ "branch": branch, "author": author }));
    } else {
        output.line(&author);
    }
    Ok(())
}
