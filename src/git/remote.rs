//! Parsing of remote URLs
//!
//! Handles the shapes git accepts for hosted repositories:
//!
//! - `https://github.com/owner/repo.git`
//! - `https://user@bitbucket.org/owner/repo.git`
//! - `ssh://git@gitlab.com/owner/repo`
//! - `git@github.com:owner/repo.git`

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[^:]*://(?:[^@]*@)?|git@)([^/:]+)[/:](.+)$").expect("valid remote URL regex")
});

/// Host and repository path of a remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteUrl {
    pub hostname: String,
    /// `owner/repo`, without a trailing `.git`
    pub repository: String,
}

impl RemoteUrl {
    /// Returns `None` for URLs that don't name a host, such as local paths
    pub fn parse(url: &str) -> Option<Self> {
        let caps = URL_RE.captures(url.trim())?;
        let hostname = caps.get(1)?.as_str().to_string();
        let path = caps.get(2)?.as_str().trim_end_matches('/');
        let repository = path.strip_suffix(".git").unwrap_or(path).to_string();
        if repository.is_empty() {
            return None;
        }
        Some(Self {
            hostname,
            repository,
        })
    }
}
