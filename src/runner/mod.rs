//! # Command Runner
//!
//! Everything this crate knows about a repository it learns by running
//! `git` and reading its text output. [`CommandRunner`] is that boundary:
//! the rest of the crate only ever calls [`CommandRunner::execute`].
//!
//! ## Implementations
//!
//! | Runner | Purpose |
//! |--------|---------|
//! | [`SystemRunner`] | Spawns real processes |
//! | [`FakeGit`] | In-memory `git` used by tests |
//!
//! Steps that change the repository go through [`Script`], which adds
//! dry-run simulation on top of any runner.

mod fake;
mod script;

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

pub use fake::FakeGit;
pub use script::{current_branch, format_command, DryRunState, Script, ScriptError};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Empty command line")]
    EmptyCommand,

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// A successful, silent result
    pub fn empty() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout with surrounding whitespace removed
    pub fn text(&self) -> &str {
        self.stdout.trim()
    }

    /// Non-empty stdout lines, each trimmed
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines().map(str::trim).filter(|l| !l.is_empty())
    }

    /// Returns true if any stdout line equals `needle` after trimming
    pub fn contains_line(&self, needle: &str) -> bool {
        self.lines().any(|line| line == needle)
    }
}

/// Runs an external command line and captures its output.
///
/// `argv[0]` is the program. A command that runs but exits non-zero is
/// still `Ok`; only failing to start it at all is an error.
pub trait CommandRunner {
    fn execute(&self, argv: &[&str]) -> Result<CommandOutput, RunnerError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn execute(&self, argv: &[&str]) -> Result<CommandOutput, RunnerError> {
        (**self).execute(argv)
    }
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    cwd: Option<PathBuf>,
}

impl SystemRunner {
    /// Runs commands in the process's current directory
    pub fn new() -> Self {
        Self { cwd: None }
    }

    /// Runs commands inside the given directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn execute(&self, argv: &[&str]) -> Result<CommandOutput, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;
        debug!(?argv, "Running command");

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| RunnerError::Spawn {
            command: argv.join(" "),
            source,
        })?;

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code(),
        };
        if !result.success() {
            debug!(?argv, code = ?result.code, stderr = %result.stderr.trim(), "Command exited unsuccessfully");
        }
        Ok(result)
    }
}
