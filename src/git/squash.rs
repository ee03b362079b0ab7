//! Picking the author of a squash commit
//!
//! One author on the branch is used as is. Several authors are listed
//! and the operator chooses, retrying until the choice is valid.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::domain::{parse_selection, parse_shortlog, Author, AuthorError, BranchName};
use crate::runner::{CommandRunner, RunnerError};
use crate::storage::{Hierarchy, HierarchyError};

pub const AUTHOR_PROMPT: &str = "Enter user's number or a custom author (default: 1): ";

#[derive(Debug, Error)]
pub enum SquashError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Author(#[from] AuthorError),

    #[error("Failed to talk to the operator: {0}")]
    Io(#[from] io::Error),

    #[error("'{command}' failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("No main branch configured. Run 'git-town main-branch <name>' first.")]
    NoMainBranch,
}

/// Source of operator answers
pub trait UserInput {
    /// Blocks for one line. The line is returned untrimmed; an empty
    /// string means end of input.
    fn read_line(&mut self) -> io::Result<String>;
}

/// Reads answers from the process's stdin
#[derive(Debug, Default)]
pub struct StdinInput;

impl UserInput for StdinInput {
    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Finds the author of a branch's commits relative to the main branch
#[derive(Debug, Clone)]
pub struct SquashAuthorResolver<R: CommandRunner> {
    hierarchy: Hierarchy<R>,
}

impl<R: CommandRunner> SquashAuthorResolver<R> {
    pub fn new(runner: R) -> Self {
        Self {
            hierarchy: Hierarchy::new(runner),
        }
    }

    /// Authors of the commits in `main..branch`, most commits first
    pub fn branch_authors(&self, branch: &BranchName) -> Result<Vec<Author>, SquashError> {
        let main = self
            .hierarchy
            .main_branch()?
            .ok_or(SquashError::NoMainBranch)?;
        let range = format!("{}..{}", main, branch);
        let argv = ["git", "shortlog", "-s", "-n", "-e", range.as_str()];
        let output = self.hierarchy.store().runner().execute(&argv)?;
        if !output.success() {
            return Err(SquashError::CommandFailed {
                command: argv.join(" "),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(parse_shortlog(&output.stdout)?)
    }

    /// Resolves the squash author, asking the operator when ambiguous
    pub fn resolve(
        &self,
        branch: &BranchName,
        input: &mut impl UserInput,
        out: &mut impl Write,
    ) -> Result<String, SquashError> {
        let authors = self.branch_authors(branch)?;
        choose_author(branch, &authors, input, out)
    }
}

/// Picks one author from `authors`.
///
/// A single author is returned without reading input. Otherwise the
/// numbered list is written to `out` and the prompt repeats until the
/// answer is valid; an out-of-range number is reported and asked again.
pub fn choose_author(
    branch: &BranchName,
    authors: &[Author],
    input: &mut impl UserInput,
    out: &mut impl Write,
) -> Result<String, SquashError> {
    match authors {
        [] => return Err(AuthorError::NoCommits(branch.to_string()).into()),
        [only] => return Ok(only.name_and_email.clone()),
        _ => {}
    }

    writeln!(out, "Multiple people authored the '{}' branch.", branch)?;
    writeln!(out, "Please choose an author for the squash commit.")?;
    writeln!(out)?;
    for (i, author) in authors.iter().enumerate() {
        writeln!(out, "  {}: {}", i + 1, author)?;
    }
    writeln!(out)?;

    loop {
        write!(out, "{}", AUTHOR_PROMPT)?;
        out.flush()?;
        let line = input.read_line()?;
        match parse_selection(line.trim(), authors) {
            Ok(author) => return Ok(author),
            Err(AuthorError::InvalidSelection(answer)) => {
                debug!(%answer, "Invalid author selection");
                writeln!(out, "Invalid author number: {}", answer)?;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
