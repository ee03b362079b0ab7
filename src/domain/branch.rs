//! Branch names
//!
//! Branch lists are stored space-joined in git config, so a name may not
//! contain whitespace. Git itself forbids that too; the check here keeps
//! bad input from corrupting a stored list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Remote whose branches act as tracking branches
pub const ORIGIN: &str = "origin";

#[derive(Debug, Error, PartialEq)]
pub enum BranchNameError {
    #[error("Branch name cannot be empty")]
    Empty,

    #[error("Branch name cannot contain whitespace: '{0}'")]
    Whitespace(String),
}

/// Name of a local branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the remote branch this branch tracks, e.g. `origin/feature`
    pub fn tracking_name(&self) -> String {
        tracking_branch_name(&self.0)
    }

    /// Parses a space-joined list as stored in git config
    pub fn parse_list(value: &str) -> Result<Vec<Self>, BranchNameError> {
        value.split_whitespace().map(str::parse::<Self>).collect()
    }

    /// Joins names the way git config stores them
    pub fn join_list(names: &[Self]) -> String {
        names.iter().map(Self::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// The remote counterpart of a local branch
pub fn tracking_branch_name(local: &str) -> String {
    format!("{}/{}", ORIGIN, local)
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BranchName {
    type Err = BranchNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BranchNameError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(BranchNameError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> BranchName {
        s.parse().unwrap()
    }

    #[test]
    fn parse_valid_names() {
        assert_eq!(name("feature/login").as_str(), "feature/login");
        assert_eq!(name("  main ").as_str(), "main");
    }

    #[test]
    fn reject_empty_and_whitespace() {
        assert_eq!("".parse::<BranchName>(), Err(BranchNameError::Empty));
        assert_eq!("   ".parse::<BranchName>(), Err(BranchNameError::Empty));
        assert!(matches!(
            "my branch".parse::<BranchName>(),
            Err(BranchNameError::Whitespace(_))
        ));
    }

    #[test]
    fn tracking_name_uses_origin() {
        assert_eq!(name("feature").tracking_name(), "origin/feature");
        assert_eq!(tracking_branch_name("a/b"), "origin/a/b");
    }

    #[test]
    fn list_round_trip_preserves_order() {
        let list = BranchName::parse_list("qa  production staging").unwrap();
        assert_eq!(list, vec![name("qa"), name("production"), name("staging")]);
        assert_eq!(BranchName::join_list(&list), "qa production staging");
    }

    #[test]
    fn empty_list_value() {
        assert!(BranchName::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn serde_as_plain_string() {
        let json = serde_json::to_string(&name("feature")).unwrap();
        assert_eq!(json, "\"feature\"");

        let parsed: BranchName = serde_json::from_str("\"develop\"").unwrap();
        assert_eq!(parsed, name("develop"));

        let invalid: Result<BranchName, _> = serde_json::from_str("\"\"");
        assert!(invalid.is_err());
    }
}
