//! Workflow steps with dry-run support
//!
//! Queries always run for real. Steps (checkout, branch, push, ...) go
//! through [`Script::run`], which in dry-run mode only simulates them.
//! The only simulated effect is `git checkout <branch>` moving the
//! current-branch pointer held in [`DryRunState`].

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use super::{CommandOutput, CommandRunner, RunnerError};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("'{command}' failed: {stderr}")]
    StepFailed { command: String, stderr: String },

    #[error("Cannot determine the current branch: {0}")]
    CurrentBranch(String),
}

/// Simulation state for one dry run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunState {
    current_branch: String,
}

impl DryRunState {
    /// Starts a simulation from the branch that is checked out right now
    pub fn new(current_branch: impl Into<String>) -> Self {
        Self {
            current_branch: current_branch.into(),
        }
    }

    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    /// Applies the simulated effect of a step, if it has one
    fn simulate(&mut self, argv: &[&str]) {
        if let [_, "checkout", branch] = argv {
            self.current_branch = branch.to_string();
        }
    }
}

/// Runs workflow steps, or pretends to
pub struct Script<R: CommandRunner> {
    runner: R,
    dry_run: Option<DryRunState>,
}

impl<R: CommandRunner> Script<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            dry_run: None,
        }
    }

    /// Creates a script that simulates every step
    pub fn dry_run(runner: R, state: DryRunState) -> Self {
        Self {
            runner,
            dry_run: Some(state),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.is_some()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Name of the checked-out branch, as the simulation sees it
    pub fn current_branch(&self) -> Result<String, ScriptError> {
        if let Some(state) = &self.dry_run {
            return Ok(state.current_branch().to_string());
        }
        current_branch(&self.runner)
    }

    /// The line printed before a step runs, e.g. `[main] git checkout feature`
    pub fn describe(&self, argv: &[&str]) -> String {
        let command = format_command(argv);
        if argv.first() != Some(&"git") {
            return command;
        }
        match self.current_branch() {
            Ok(branch) if !branch.is_empty() => format!("[{}] {}", branch, command),
            _ => command,
        }
    }

    /// Runs one step; a non-zero exit aborts the workflow
    pub fn run(&mut self, argv: &[&str]) -> Result<CommandOutput, ScriptError> {
        if let Some(state) = &mut self.dry_run {
            info!(command = %format_command(argv), "Dry run: step not executed");
            state.simulate(argv);
            return Ok(CommandOutput::empty());
        }

        let output = self.runner.execute(argv)?;
        if !output.success() {
            return Err(ScriptError::StepFailed {
                command: format_command(argv),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Name of the checked-out branch.
///
/// During a rebase `HEAD` is detached, so the branch being rebased is
/// read from git's rebase state instead.
pub fn current_branch<R: CommandRunner>(runner: &R) -> Result<String, ScriptError> {
    let output = runner.execute(&["git", "rev-parse", "--abbrev-ref", "HEAD"])?;
    if !output.success() {
        return Err(ScriptError::CurrentBranch(output.stderr.trim().to_string()));
    }
    let name = output.text();
    if name != "HEAD" {
        return Ok(name.to_string());
    }

    let git_dir = runner.execute(&["git", "rev-parse", "--absolute-git-dir"])?;
    if git_dir.success() {
        if let Some(branch) = rebase_head_name(Path::new(git_dir.text())) {
            debug!(%branch, "Current branch taken from rebase state");
            return Ok(branch);
        }
    }
    Ok(name.to_string())
}

/// Branch recorded by an in-progress rebase, for either rebase backend
fn rebase_head_name(git_dir: &Path) -> Option<String> {
    ["rebase-merge", "rebase-apply"].iter().find_map(|dir| {
        let content = fs::read_to_string(git_dir.join(dir).join("head-name")).ok()?;
        let name = content.trim();
        Some(name.strip_prefix("refs/heads/").unwrap_or(name).to_string())
    })
}

/// Renders argv as a shell-like line, quoting arguments that contain spaces
pub fn format_command(argv: &[&str]) -> String {
    argv.iter()
        .map(|part| {
            if part.contains(' ') {
                format!("\"{}\"", part.replace('"', "\\\""))
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
