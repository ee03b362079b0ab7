//! CLI integration tests for git-town
//!
//! Each test drives the binary against a throwaway git repository. HOME
//! points into a temp directory so global settings never touch the
//! developer's own git configuration.

use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A repository with its own HOME and, optionally, a bare `origin`
struct TestRepo {
    home: TempDir,
    dir: TempDir,
    _remote: Option<TempDir>,
}

impl TestRepo {
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Runs git inside the repository, panicking on failure
    fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn config(&self, key: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["config", "--local", key])
            .current_dir(self.path())
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// A command for the git-town binary running inside this repository
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = git_town_cmd();
        cmd.current_dir(self.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path())
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove("GIT_TOWN_ENV")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Get a command instance for the git-town binary
fn git_town_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("git-town"))
}

/// Create a repository on `main` with one commit
fn setup_repo() -> TestRepo {
    let repo = TestRepo {
        home: TempDir::new().unwrap(),
        dir: TempDir::new().unwrap(),
        _remote: None,
    };
    repo.git(&["init", "-q"]);
    repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
    repo.git(&["config", "user.name", "Test"]);
    repo.git(&["config", "user.email", "test@example.com"]);
    repo.git(&["commit", "-q", "--allow-empty", "-m", "initial"]);
    repo
}

/// Create a repository with git-town configured and a bare `origin`
fn setup_repo_with_remote() -> TestRepo {
    let mut repo = setup_repo();
    let remote = TempDir::new().unwrap();
    let remote_path = remote.path().to_str().unwrap().to_string();
    repo.git(&["init", "-q", "--bare", &remote_path]);
    repo.git(&["remote", "add", "origin", &remote_path]);
    repo.git(&["push", "-q", "-u", "origin", "main"]);
    repo._remote = Some(remote);
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo
}

// =============================================================================
// Repository Detection
// =============================================================================

#[test]
fn test_outside_repository_fails() {
    let dir = TempDir::new().unwrap();

    git_town_cmd()
        .current_dir(dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path())
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a git repository"));
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_shows_defaults() {
    let repo = setup_repo();

    repo.cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Main branch:\t[none]"))
        .stdout(predicate::str::contains("Pull branch strategy:\trebase"))
        .stdout(predicate::str::contains("Hack push:\ttrue"));
}

#[test]
fn test_config_json() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);

    let output = repo.cmd().args(["--format", "json", "config"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["main_branch"], "main");
    assert_eq!(json["offline"], false);
    assert_eq!(json["pull_branch_strategy"], "rebase");
}

#[test]
fn test_main_branch_set_and_show() {
    let repo = setup_repo();

    repo.cmd()
        .args(["main-branch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Main branch set to 'main'"));
    assert_eq!(repo.config("git-town.main-branch-name").as_deref(), Some("main"));

    repo.cmd()
        .arg("main-branch")
        .assert()
        .success()
        .stdout(predicate::str::diff("main\n"));
}

#[test]
fn test_main_branch_must_exist() {
    let repo = setup_repo();

    repo.cmd()
        .args(["main-branch", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("There is no branch named 'nope'"));
}

#[test]
fn test_perennial_branches() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["branch", "qa"]);
    repo.git(&["branch", "production"]);

    repo.cmd()
        .args(["perennial-branches", "add", "qa", "production"])
        .assert()
        .success();
    repo.cmd()
        .args(["perennial-branches", "add", "qa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already a perennial branch"));

    assert_eq!(
        repo.config("git-town.perennial-branch-names").as_deref(),
        Some("qa production")
    );

    repo.cmd()
        .args(["perennial-branches", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("qa\nproduction\n"));
}

#[test]
fn test_main_branch_cannot_be_perennial() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);

    repo.cmd()
        .args(["perennial-branches", "add", "main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be perennial"));
}

#[test]
fn test_offline_is_global() {
    let repo = setup_repo();

    repo.cmd().args(["offline", "true"]).assert().success();

    assert_eq!(repo.config("git-town.offline"), None);
    assert_eq!(repo.git(&["config", "--global", "git-town.offline"]), "true");
    repo.cmd()
        .arg("offline")
        .assert()
        .success()
        .stdout(predicate::str::diff("true\n"));
}

#[test]
fn test_hack_push_flag() {
    let repo = setup_repo();

    repo.cmd().args(["hack-push-flag", "false"]).assert().success();

    assert_eq!(repo.config("git-town.hack-push-flag").as_deref(), Some("false"));
}

#[test]
fn test_pull_branch_strategy() {
    let repo = setup_repo();

    repo.cmd()
        .args(["pull-branch-strategy", "merge"])
        .assert()
        .success();
    assert_eq!(
        repo.config("git-town.pull-branch-strategy").as_deref(),
        Some("merge")
    );

    repo.cmd()
        .args(["pull-branch-strategy", "squash"])
        .assert()
        .failure();
}

#[test]
fn test_stored_unknown_strategy_is_rejected() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.pull-branch-strategy", "squash"]);

    repo.cmd()
        .arg("pull-branch-strategy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'git-town.pull-branch-strategy'"));
}

#[test]
fn test_reset_config_removes_everything() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["config", "git-town-branch.feature.parent", "main"]);
    repo.git(&["config", "git-town-branch.feature.ancestors", ""]);

    repo.cmd().arg("reset-config").assert().success();

    let remaining = repo.git(&["config", "--local", "--list", "--name-only"]);
    assert!(!remaining.contains("git-town"), "left behind: {}", remaining);
    assert!(remaining.contains("user.name"));
}

// =============================================================================
// Hierarchy Tests
// =============================================================================

fn setup_hierarchy() -> TestRepo {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.cmd().args(["parent", "feature", "main"]).assert().success();
    repo.cmd().args(["parent", "child", "feature"]).assert().success();
    repo.cmd().args(["parent", "other", "main"]).assert().success();
    repo
}

#[test]
fn test_parent_round_trip() {
    let repo = setup_hierarchy();

    assert_eq!(
        repo.config("git-town-branch.child.parent").as_deref(),
        Some("feature")
    );
    repo.cmd()
        .args(["parent", "child"])
        .assert()
        .success()
        .stdout(predicate::str::diff("feature\n"));

    repo.cmd().args(["parent", "child", "--remove"]).assert().success();
    repo.cmd()
        .args(["parent", "child"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[none]\n"));
}

#[test]
fn test_main_branch_has_no_parent() {
    let repo = setup_hierarchy();

    repo.cmd()
        .args(["parent", "main", "feature"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no parent"));
}

#[test]
fn test_children_sorted() {
    let repo = setup_hierarchy();

    repo.cmd()
        .args(["children", "main"])
        .assert()
        .success()
        .stdout(predicate::str::diff("feature\nother\n"));
}

#[test]
fn test_ancestors_cache_lifecycle() {
    let repo = setup_hierarchy();

    repo.cmd()
        .args(["ancestors", "child"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[not computed]"));

    repo.cmd()
        .args(["ancestors", "child", "--compute"])
        .assert()
        .success()
        .stdout(predicate::str::diff("feature\n"));
    assert_eq!(
        repo.config("git-town-branch.child.ancestors").as_deref(),
        Some("feature")
    );

    repo.cmd()
        .arg("clear-ancestors")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 ancestor cache(s)"));
    assert_eq!(repo.config("git-town-branch.child.ancestors"), None);
}

#[test]
fn test_reparenting_clears_caches() {
    let repo = setup_hierarchy();
    repo.cmd()
        .args(["ancestors", "child", "--compute"])
        .assert()
        .success();

    repo.cmd().args(["parent", "child", "other"]).assert().success();

    assert_eq!(repo.config("git-town-branch.child.ancestors"), None);
}

#[test]
fn test_cycle_is_reported() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["config", "git-town-branch.a.parent", "b"]);
    repo.git(&["config", "git-town-branch.b.parent", "a"]);

    repo.cmd()
        .args(["ancestors", "a", "--compute"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle: a -> b -> a"));
}

#[test]
fn test_hierarchy_tree() {
    let repo = setup_hierarchy();

    repo.cmd()
        .arg("hierarchy")
        .assert()
        .success()
        .stdout(predicate::str::diff("main\n  feature\n    child\n  other\n"));
}

// =============================================================================
// State Tests
// =============================================================================

#[test]
fn test_branches_lists_main_first() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["branch", "alpha"]);

    let output = repo
        .cmd()
        .args(["--format", "json", "branches"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let branches = json["branches"].as_array().unwrap();
    assert_eq!(branches[0]["branch"], "main");
    assert_eq!(branches[0]["kind"], "main");
    assert_eq!(branches[0]["current"], true);
    assert_eq!(branches[1]["branch"], "alpha");
}

#[test]
fn test_status_without_tracking_branch() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);

    repo.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync state:\tno tracking branch"));
}

#[test]
fn test_status_tracks_remote() {
    let repo = setup_repo_with_remote();

    repo.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync state:\tin sync"));

    repo.git(&["commit", "-q", "--allow-empty", "-m", "local work"]);

    repo.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync state:\tneeds push"))
        .stdout(predicate::str::contains("Needs push:\tyes"));
}

#[test]
fn test_repo_uses_testing_remote_url_only_in_test_mode() {
    let repo = setup_repo();
    repo.git(&[
        "config",
        "git-town.testing.remote-url",
        "git@github.com:git-town/git-town.git",
    ]);

    repo.cmd()
        .arg("repo")
        .env("GIT_TOWN_ENV", "test")
        .assert()
        .success()
        .stdout(predicate::str::contains("Host:\tgithub.com"))
        .stdout(predicate::str::contains("Repository:\tgit-town/git-town"));

    repo.cmd()
        .arg("repo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Origin:\t[none]"));
}

// =============================================================================
// Squash Author Tests
// =============================================================================

#[test]
fn test_squash_author_single_author() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["checkout", "-q", "-b", "feature"]);
    repo.git(&["commit", "-q", "--allow-empty", "-m", "one"]);

    repo.cmd()
        .arg("squash-author")
        .assert()
        .success()
        .stdout(predicate::str::diff("Test <test@example.com>\n"));
}

#[test]
fn test_squash_author_prompts_when_ambiguous() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["checkout", "-q", "-b", "feature"]);
    repo.git(&["commit", "-q", "--allow-empty", "-m", "one"]);
    repo.git(&["commit", "-q", "--allow-empty", "-m", "two"]);
    repo.git(&[
        "-c",
        "user.name=Other",
        "-c",
        "user.email=other@example.com",
        "commit",
        "-q",
        "--allow-empty",
        "-m",
        "three",
    ]);

    repo.cmd()
        .args(["squash-author", "feature"])
        .write_stdin("7\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::diff("Other <other@example.com>\n"))
        .stderr(predicate::str::contains("Multiple people authored the 'feature' branch."))
        .stderr(predicate::str::contains("1: Test <test@example.com> (2 commits)"))
        .stderr(predicate::str::contains("2: Other <other@example.com> (1 commit)"))
        .stderr(predicate::str::contains("Invalid author number: 7"))
        .stderr(predicate::str::contains("Invalid author").count(1));
}

#[test]
fn test_squash_author_without_commits() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["branch", "empty"]);

    repo.cmd()
        .args(["squash-author", "empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no commits of its own"));
}

// =============================================================================
// Hack Tests
// =============================================================================

#[test]
fn test_hack_dry_run_changes_nothing() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);

    repo.cmd()
        .args(["hack", "login", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In dry run mode"))
        .stdout(predicate::str::contains("[main] git checkout main"))
        .stdout(predicate::str::contains("[main] git branch login main"))
        .stdout(predicate::str::contains("[main] git checkout login"))
        .stdout(predicate::str::contains(
            "[login] git config git-town-branch.login.parent main",
        ));

    assert!(!repo.git(&["branch"]).contains("login"));
    assert_eq!(repo.config("git-town-branch.login.parent"), None);
}

#[test]
fn test_hack_creates_branch_locally() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);

    repo.cmd()
        .args(["hack", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 'login' off 'main'"));

    assert_eq!(repo.git(&["rev-parse", "--abbrev-ref", "HEAD"]), "login");
    assert_eq!(
        repo.config("git-town-branch.login.parent").as_deref(),
        Some("main")
    );
}

#[test]
fn test_hack_pushes_to_origin() {
    let repo = setup_repo_with_remote();

    repo.cmd()
        .args(["hack", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("git fetch --prune origin"))
        .stdout(predicate::str::contains("[login] git push -u origin login"));

    assert!(repo.git(&["branch", "-r"]).contains("origin/login"));
}

#[test]
fn test_hack_respects_push_flag() {
    let repo = setup_repo_with_remote();
    repo.git(&["config", "git-town.hack-push-flag", "false"]);

    repo.cmd().args(["hack", "login"]).assert().success();

    assert!(!repo.git(&["branch", "-r"]).contains("origin/login"));
}

#[test]
fn test_hack_existing_branch_fails() {
    let repo = setup_repo();
    repo.git(&["config", "git-town.main-branch-name", "main"]);
    repo.git(&["branch", "login"]);

    repo.cmd()
        .args(["hack", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch named 'login' already exists"));
}

#[test]
fn test_hack_needs_main_branch() {
    let repo = setup_repo();

    repo.cmd()
        .args(["hack", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No main branch configured"));
}
