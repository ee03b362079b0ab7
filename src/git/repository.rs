//! Access to the repository the tool runs in

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::branches;
use super::squash::SquashAuthorResolver;
use super::sync::{SyncError, SyncResolver};
use crate::runner::{self, DryRunState, RunnerError, Script, ScriptError, SystemRunner};
use crate::storage::{Hierarchy, Settings};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not in a git repository")]
    NotARepository,

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// A git working tree and the components that read it
pub struct Repository {
    root: PathBuf,
    runner: SystemRunner,
}

impl Repository {
    /// Opens the repository containing `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let probe = SystemRunner::in_dir(dir);
        let root = match branches::root_directory(&probe) {
            Ok(root) => root,
            Err(SyncError::Runner(e)) => return Err(e.into()),
            Err(_) => return Err(RepoError::NotARepository),
        };
        Ok(Self {
            runner: SystemRunner::in_dir(&root),
            root,
        })
    }

    /// Opens the repository containing the current directory
    pub fn open_current() -> Result<Self, RepoError> {
        let cwd = std::env::current_dir().map_err(|_| RepoError::NotARepository)?;
        Self::open(cwd)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runner(&self) -> &SystemRunner {
        &self.runner
    }

    pub fn hierarchy(&self) -> Hierarchy<&SystemRunner> {
        Hierarchy::new(&self.runner)
    }

    pub fn settings(&self) -> Settings<&SystemRunner> {
        Settings::new(&self.runner)
    }

    pub fn sync(&self) -> SyncResolver<&SystemRunner> {
        SyncResolver::new(&self.runner)
    }

    pub fn squash_authors(&self) -> SquashAuthorResolver<&SystemRunner> {
        SquashAuthorResolver::new(&self.runner)
    }

    /// A script for workflow steps; in dry run it starts from the
    /// branch that is checked out now
    pub fn script(&self, dry_run: bool) -> Result<Script<&SystemRunner>, RepoError> {
        if !dry_run {
            return Ok(Script::new(&self.runner));
        }
        let current = runner::current_branch(&self.runner)?;
        Ok(Script::dry_run(&self.runner, DryRunState::new(current)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    fn init_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(dir.path(), &["config", "user.name", "Test"]);
        git(dir.path(), &["config", "user.email", "test@example.com"]);
        git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
        dir
    }

    #[test]
    fn open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();

        let result = Repository::open(dir.path());
        assert!(matches!(result, Err(RepoError::NotARepository)));
    }

    #[test]
    fn open_from_subdirectory_finds_root() {
        let dir = init_repo();
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();

        let repo = Repository::open(&sub).unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(repo.root().canonicalize().unwrap(), expected);
    }

    #[test]
    fn config_round_trip_through_real_git() {
        let dir = init_repo();
        let repo = Repository::open(dir.path()).unwrap();
        let main: crate::domain::BranchName = "main".parse().unwrap();

        repo.hierarchy().set_main_branch(&main).unwrap();

        assert_eq!(repo.hierarchy().main_branch().unwrap(), Some(main));
    }

    #[test]
    fn dry_run_script_starts_on_current_branch() {
        let dir = init_repo();
        let repo = Repository::open(dir.path()).unwrap();

        let script = repo.script(true).unwrap();
        assert!(script.is_dry_run());
        assert_eq!(script.current_branch().unwrap(), "main");
    }

    #[test]
    fn dry_run_script_starts_on_branch_being_rebased() {
        let dir = init_repo();
        git(dir.path(), &["branch", "feature"]);
        git(dir.path(), &["checkout", "-q", "--detach", "feature"]);
        let rebase = dir.path().join(".git").join("rebase-merge");
        std::fs::create_dir(&rebase).unwrap();
        std::fs::write(rebase.join("head-name"), "refs/heads/feature\n").unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        let script = repo.script(true).unwrap();
        assert_eq!(script.current_branch().unwrap(), "feature");
        assert_eq!(runner::current_branch(repo.runner()).unwrap(), "feature");
    }
}
