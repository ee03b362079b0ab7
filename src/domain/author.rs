//! Commit authors of a branch
//!
//! A squash commit gets exactly one author. When several people worked
//! on a branch the operator picks one from a numbered list, or types
//! any other author string.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AuthorError {
    #[error("Unexpected shortlog output line: '{0}'")]
    Parse(String),

    #[error("Invalid author number: {0}")]
    InvalidSelection(String),

    #[error("Branch '{0}' has no commits of its own")]
    NoCommits(String),
}

/// One author and how many commits they made on the branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    /// `Name <email>` exactly as git prints it
    pub name_and_email: String,
    pub commit_count: u32,
}

impl Author {
    pub fn new(name_and_email: impl Into<String>, commit_count: u32) -> Self {
        Self {
            name_and_email: name_and_email.into(),
            commit_count,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.name_and_email,
            pluralize(self.commit_count, "commit")
        )
    }
}

/// Parses `git shortlog -s -n -e` output: `<count>\t<Name <email>>` per line.
///
/// Order is kept as git printed it (most commits first).
pub fn parse_shortlog(output: &str) -> Result<Vec<Author>, AuthorError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| -> Result<Author, AuthorError> {
            let (count, name) = line
                .split_once('\t')
                .ok_or_else(|| AuthorError::Parse(line.to_string()))?;
            let commit_count = count
                .trim()
                .parse()
                .map_err(|_| AuthorError::Parse(line.to_string()))?;
            Ok(Author::new(name.trim(), commit_count))
        })
        .collect()
}

/// Interprets one line of operator input against the numbered author list.
///
/// - empty: the first author
/// - a number in `1..=N`: that author
/// - any other number: [`AuthorError::InvalidSelection`]
/// - anything else: taken verbatim as a custom author
pub fn parse_selection(input: &str, authors: &[Author]) -> Result<String, AuthorError> {
    if input.is_empty() {
        return authors
            .first()
            .map(|a| a.name_and_email.clone())
            .ok_or_else(|| AuthorError::InvalidSelection(input.to_string()));
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let index: usize = input
            .parse()
            .map_err(|_| AuthorError::InvalidSelection(input.to_string()))?;
        return index
            .checked_sub(1)
            .and_then(|i| authors.get(i))
            .map(|a| a.name_and_email.clone())
            .ok_or_else(|| AuthorError::InvalidSelection(input.to_string()));
    }

    Ok(input.to_string())
}

/// `1 commit`, `2 commits`
pub fn pluralize(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
