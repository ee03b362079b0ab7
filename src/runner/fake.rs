//! In-memory `git` for tests
//!
//! Emulates `git config` well enough for the configuration store (two
//! scopes, insertion-ordered enumeration, the exit codes git uses for
//! missing keys and sections) and answers every other command from a
//! table of canned responses. Every invocation is recorded.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{CommandOutput, CommandRunner, RunnerError};

/// Exit code git uses for `config --unset` on a missing key
const EXIT_KEY_NOT_SET: i32 = 5;

/// Exit code git uses for a missing key on `config <key>`
const EXIT_NOT_FOUND: i32 = 1;

/// Exit code git uses for fatal errors such as an unknown section
const EXIT_FATAL: i32 = 128;

#[derive(Debug, Default)]
struct FakeState {
    local: Vec<(String, String)>,
    global: Vec<(String, String)>,
    responses: HashMap<String, CommandOutput>,
    calls: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FakeScope {
    Local,
    Global,
}

/// A scripted stand-in for the `git` binary
#[derive(Debug, Default)]
pub struct FakeGit {
    state: RefCell<FakeState>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a key in the local (repository) scope
    pub fn set_local(&self, key: &str, value: &str) {
        upsert(&mut self.state.borrow_mut().local, key, value);
    }

    /// Stores a key in the global (user) scope
    pub fn set_global(&self, key: &str, value: &str) {
        upsert(&mut self.state.borrow_mut().global, key, value);
    }

    pub fn local(&self, key: &str) -> Option<String> {
        lookup(&self.state.borrow().local, key)
    }

    pub fn global(&self, key: &str) -> Option<String> {
        lookup(&self.state.borrow().global, key)
    }

    /// All local keys in insertion order
    pub fn local_keys(&self) -> Vec<String> {
        self.state.borrow().local.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Answers `git <args>` with the given stdout and exit code 0
    pub fn respond(&self, args: &[&str], stdout: &str) {
        let output = CommandOutput {
            stdout: stdout.to_string(),
            ..CommandOutput::empty()
        };
        self.state.borrow_mut().responses.insert(args.join(" "), output);
    }

    /// Answers `git <args>` with a failure
    pub fn fail(&self, args: &[&str], code: i32, stderr: &str) {
        let output = CommandOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            code: Some(code),
        };
        self.state.borrow_mut().responses.insert(args.join(" "), output);
    }

    /// Every command executed so far, as space-joined argv without `git`
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Number of recorded calls starting with the given argv prefix
    pub fn count_calls(&self, prefix: &[&str]) -> usize {
        let prefix = prefix.join(" ");
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .count()
    }

    fn config(&self, args: &[&str]) -> CommandOutput {
        let mut scope = None;
        let mut list = false;
        let mut name_only = false;
        let mut unset = false;
        let mut remove_section = false;
        let mut positional = Vec::new();

        for arg in args {
            match *arg {
                "--local" => scope = Some(FakeScope::Local),
                "--global" => scope = Some(FakeScope::Global),
                "-l" | "--list" => list = true,
                "--name-only" => name_only = true,
                "--unset" => unset = true,
                "--remove-section" => remove_section = true,
                other => positional.push(other),
            }
        }

        let mut state = self.state.borrow_mut();

        if list {
            let entries: Vec<(String, String)> = match scope {
                Some(FakeScope::Local) => state.local.clone(),
                Some(FakeScope::Global) => state.global.clone(),
                None => state.global.iter().chain(state.local.iter()).cloned().collect(),
            };
            let stdout = entries
                .iter()
                .map(|(k, v)| if name_only { format!("{}\n", k) } else { format!("{}={}\n", k, v) })
                .collect();
            return CommandOutput {
                stdout,
                ..CommandOutput::empty()
            };
        }

        if unset {
            let Some(key) = positional.first() else {
                return failure(EXIT_FATAL, "error: wrong number of arguments");
            };
            let entries = scoped_mut(&mut state, scope.unwrap_or(FakeScope::Local));
            let before = entries.len();
            entries.retain(|(k, _)| k != key);
            return if entries.len() == before {
                failure(EXIT_KEY_NOT_SET, "")
            } else {
                CommandOutput::empty()
            };
        }

        if remove_section {
            let Some(section) = positional.first() else {
                return failure(EXIT_FATAL, "error: wrong number of arguments");
            };
            let prefix = format!("{}.", section);
            let entries = scoped_mut(&mut state, scope.unwrap_or(FakeScope::Local));
            let before = entries.len();
            entries.retain(|(k, _)| {
                // A section owns `section.key` but not `section.sub.key`
                !(k.starts_with(&prefix) && !k[prefix.len()..].contains('.'))
            });
            return if entries.len() == before {
                failure(EXIT_FATAL, "fatal: no such section!")
            } else {
                CommandOutput::empty()
            };
        }

        match positional.as_slice() {
            [key] => {
                let value = match scope {
                    Some(FakeScope::Local) => lookup(&state.local, key),
                    Some(FakeScope::Global) => lookup(&state.global, key),
                    None => lookup(&state.local, key).or_else(|| lookup(&state.global, key)),
                };
                match value {
                    Some(value) => CommandOutput {
                        stdout: format!("{}\n", value),
                        ..CommandOutput::empty()
                    },
                    None => failure(EXIT_NOT_FOUND, ""),
                }
            }
            [key, value] => {
                upsert(scoped_mut(&mut state, scope.unwrap_or(FakeScope::Local)), key, value);
                CommandOutput::empty()
            }
            _ => failure(EXIT_FATAL, "error: wrong number of arguments"),
        }
    }
}

impl CommandRunner for FakeGit {
    fn execute(&self, argv: &[&str]) -> Result<CommandOutput, RunnerError> {
        let (program, args) = argv.split_first().ok_or(RunnerError::EmptyCommand)?;
        if *program != "git" {
            return Err(RunnerError::Spawn {
                command: argv.join(" "),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake runner only knows git"),
            });
        }

        let joined = args.join(" ");
        self.state.borrow_mut().calls.push(joined.clone());

        if let Some(canned) = self.state.borrow().responses.get(&joined) {
            return Ok(canned.clone());
        }
        if args.first() == Some(&"config") {
            return Ok(self.config(&args[1..]));
        }
        Ok(CommandOutput::empty())
    }
}

fn failure(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        code: Some(code),
    }
}

fn scoped_mut(state: &mut FakeState, scope: FakeScope) -> &mut Vec<(String, String)> {
    match scope {
        FakeScope::Local => &mut state.local,
        FakeScope::Global => &mut state.global,
    }
}

fn lookup(entries: &[(String, String)], key: &str) -> Option<String> {
    entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => entries.push((key.to_string(), value.to_string())),
    }
}
