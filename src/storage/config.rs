//! Key/value access to git's configuration
//!
//! git config has no notion of hierarchy or types; this layer only
//! reads, writes and enumerates strings. A missing key reads as the
//! empty string. Scoped reads cost two commands: one listing to check
//! the key exists, one to fetch its value.

use thiserror::Error;
use tracing::debug;

use crate::domain::BranchNameError;
use crate::runner::{CommandRunner, RunnerError};

/// Exit code of `git config --unset` when the key does not exist
const EXIT_KEY_NOT_SET: i32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Failed to {action} '{key}': {stderr}")]
    CommandFailed {
        action: &'static str,
        key: String,
        stderr: String,
    },

    #[error("Invalid value for '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid branch name stored in '{key}': {source}")]
    BranchName {
        key: String,
        #[source]
        source: BranchNameError,
    },
}

/// Which git config file to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The repository's `.git/config`
    Local,
    /// The user's `~/.gitconfig`
    Global,
}

impl Scope {
    fn flag(&self) -> &'static str {
        match self {
            Scope::Local => "--local",
            Scope::Global => "--global",
        }
    }
}

/// Reads and writes git configuration through a [`CommandRunner`]
#[derive(Debug, Clone)]
pub struct ConfigStore<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> ConfigStore<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// All key names in the given scope, in git's enumeration order.
    ///
    /// A scope whose file does not exist (common for `--global`) lists
    /// nothing rather than failing.
    pub fn keys(&self, scope: Scope) -> Result<Vec<String>, ConfigError> {
        let output = self
            .runner
            .execute(&["git", "config", scope.flag(), "--list", "--name-only"])?;
        if !output.success() {
            return Ok(vec![]);
        }
        Ok(output.lines().map(str::to_string).collect())
    }

    /// Keys in the given scope accepted by `matches`
    pub fn keys_matching(
        &self,
        scope: Scope,
        matches: impl Fn(&str) -> bool,
    ) -> Result<Vec<String>, ConfigError> {
        Ok(self
            .keys(scope)?
            .into_iter()
            .filter(|key| matches(key.as_str()))
            .collect())
    }

    /// Returns true if the key is set in the given scope
    pub fn has(&self, key: &str, scope: Scope) -> Result<bool, ConfigError> {
        Ok(self.keys(scope)?.iter().any(|k| k == key))
    }

    /// Reads a value; `None` tries local first, then global.
    ///
    /// Returns an empty string when the key is absent.
    pub fn get(&self, key: &str, scope: Option<Scope>) -> Result<String, ConfigError> {
        match scope {
            Some(scope) => self.get_scoped(key, scope),
            None => {
                let local = self.get_scoped(key, Scope::Local)?;
                if !local.is_empty() {
                    return Ok(local);
                }
                self.get_scoped(key, Scope::Global)
            }
        }
    }

    /// Reads a value from any scope, falling back to `default` when empty
    pub fn get_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let value = self.get(key, None)?;
        if value.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(value)
        }
    }

    fn get_scoped(&self, key: &str, scope: Scope) -> Result<String, ConfigError> {
        if !self.has(key, scope)? {
            return Ok(String::new());
        }
        let output = self.runner.execute(&["git", "config", scope.flag(), key])?;
        if !output.success() {
            return Err(ConfigError::CommandFailed {
                action: "read",
                key: key.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.text().to_string())
    }

    /// Writes a value
    pub fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), ConfigError> {
        debug!(key, value, ?scope, "Setting config value");
        let output = self
            .runner
            .execute(&["git", "config", scope.flag(), key, value])?;
        if !output.success() {
            return Err(ConfigError::CommandFailed {
                action: "write",
                key: key.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    /// Removes a local key; removing a key that is not set is not an error
    pub fn unset(&self, key: &str) -> Result<(), ConfigError> {
        debug!(key, "Removing config value");
        let output = self
            .runner
            .execute(&["git", "config", Scope::Local.flag(), "--unset", key])?;
        if output.success() || output.code == Some(EXIT_KEY_NOT_SET) {
            return Ok(());
        }
        Err(ConfigError::CommandFailed {
            action: "remove",
            key: key.to_string(),
            stderr: output.stderr.trim().to_string(),
        })
    }

    /// Removes a whole local section, returning false if it did not exist
    pub fn remove_section(&self, section: &str) -> Result<bool, ConfigError> {
        debug!(section, "Removing config section");
        let prefix = format!("{}.", section);
        // `section.sub.key` lives in a subsection, which git keeps
        let in_section = |key: &String| {
            key.strip_prefix(&prefix)
                .is_some_and(|rest| !rest.contains('.'))
        };
        if !self.keys(Scope::Local)?.iter().any(in_section) {
            return Ok(false);
        }
        let output = self
            .runner
            .execute(&["git", "config", Scope::Local.flag(), "--remove-section", section])?;
        if !output.success() {
            return Err(ConfigError::CommandFailed {
                action: "remove section",
                key: section.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(true)
    }
}

/// Parses a stored `true` / `false` flag
pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
