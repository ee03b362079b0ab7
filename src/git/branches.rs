//! Branch listings parsed from `git branch` output

use std::path::PathBuf;

use super::sync::SyncError;
use crate::domain::{tracking_branch_name, BranchName};
use crate::runner::CommandRunner;

/// Strips the markers git puts in front of a branch line: `*` for the
/// current branch and `+` for one checked out in another worktree
fn strip_marker(line: &str) -> &str {
    line.trim_start_matches(['*', '+']).trim()
}

/// Lines like `(HEAD detached at 1a2b3c)` are not branches
fn is_detached_marker(line: &str) -> bool {
    line.starts_with('(')
}

/// Local branches in the order git lists them (alphabetical)
pub fn local_branches<R: CommandRunner>(runner: &R) -> Result<Vec<BranchName>, SyncError> {
    let output = runner.execute(&["git", "branch"])?;
    Ok(output
        .lines()
        .map(strip_marker)
        .filter(|line| !is_detached_marker(line))
        .filter_map(|line| line.parse().ok())
        .collect())
}

/// Local branches with the main branch moved to the front
pub fn local_branches_with_main_first<R: CommandRunner>(
    runner: &R,
    main: &BranchName,
) -> Result<Vec<BranchName>, SyncError> {
    let mut branches = local_branches(runner)?;
    if let Some(pos) = branches.iter().position(|b| b == main) {
        let main = branches.remove(pos);
        branches.insert(0, main);
    }
    Ok(branches)
}

/// Local branches whose tracking branch was deleted on the remote
pub fn branches_with_deleted_tracking<R: CommandRunner>(
    runner: &R,
) -> Result<Vec<BranchName>, SyncError> {
    let output = runner.execute(&["git", "branch", "-vv"])?;
    Ok(output
        .lines()
        .map(strip_marker)
        .filter_map(|line| {
            let (name, rest) = line.split_once(' ')?;
            let gone = format!("[{}: gone]", tracking_branch_name(name));
            if rest.contains(&gone) {
                name.parse().ok()
            } else {
                None
            }
        })
        .collect())
}

/// The branch checked out before the current one, if any
pub fn previously_checked_out_branch<R: CommandRunner>(
    runner: &R,
) -> Result<Option<String>, SyncError> {
    let output = runner.execute(&["git", "rev-parse", "--verify", "--abbrev-ref", "@{-1}"])?;
    if !output.success() || output.text().is_empty() {
        return Ok(None);
    }
    Ok(Some(output.text().to_string()))
}

/// Returns true if a remote with this name is configured
pub fn has_remote<R: CommandRunner>(runner: &R, name: &str) -> Result<bool, SyncError> {
    let output = runner.execute(&["git", "remote"])?;
    Ok(output.contains_line(name))
}

/// Top-level directory of the working tree
pub fn root_directory<R: CommandRunner>(runner: &R) -> Result<PathBuf, SyncError> {
    let argv = ["git", "rev-parse", "--show-toplevel"];
    let output = runner.execute(&argv)?;
    if !output.success() {
        return Err(SyncError::CommandFailed {
            command: argv.join(" "),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(PathBuf::from(output.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FakeGit;

    fn names(branches: &[BranchName]) -> Vec<&str> {
        branches.iter().map(BranchName::as_str).collect()
    }

    #[test]
    fn lists_local_branches() {
        let git = FakeGit::new();
        git.respond(
            &["branch"],
            "* (HEAD detached at 1a2b3c)\n  feature\n+ hotfix\n  main\n",
        );

        let branches = local_branches(&git).unwrap();
        assert_eq!(names(&branches), vec!["feature", "hotfix", "main"]);
    }

    #[test]
    fn main_first() {
        let git = FakeGit::new();
        git.respond(&["branch"], "  alpha\n* main\n  zeta\n");
        let main: BranchName = "main".parse().unwrap();

        let branches = local_branches_with_main_first(&git, &main).unwrap();
        assert_eq!(names(&branches), vec!["main", "alpha", "zeta"]);
    }

    #[test]
    fn deleted_tracking_branches() {
        let git = FakeGit::new();
        git.respond(
            &["branch", "-vv"],
            "  done    1a2b3c [origin/done: gone] Finish work\n\
             * main    4d5e6f [origin/main] Initial\n  \
             wip     7a8b9c [origin/wip: ahead 1] More\n  \
             local   0f0f0f Local only\n",
        );

        let branches = branches_with_deleted_tracking(&git).unwrap();
        assert_eq!(names(&branches), vec!["done"]);
    }

    #[test]
    fn previous_branch() {
        let git = FakeGit::new();
        assert_eq!(previously_checked_out_branch(&git).unwrap(), None);

        git.respond(&["rev-parse", "--verify", "--abbrev-ref", "@{-1}"], "feature\n");
        assert_eq!(
            previously_checked_out_branch(&git).unwrap().as_deref(),
            Some("feature")
        );

        git.fail(&["rev-parse", "--verify", "--abbrev-ref", "@{-1}"], 128, "fatal: Needed a single revision");
        assert_eq!(previously_checked_out_branch(&git).unwrap(), None);
    }

    #[test]
    fn remotes() {
        let git = FakeGit::new();
        git.respond(&["remote"], "origin\nupstream\n");

        assert!(has_remote(&git, "origin").unwrap());
        assert!(has_remote(&git, "upstream").unwrap());
        assert!(!has_remote(&git, "fork").unwrap());
    }

    #[test]
    fn root_directory_requires_repository() {
        let git = FakeGit::new();
        git.fail(&["rev-parse", "--show-toplevel"], 128, "fatal: not a git repository");

        assert!(root_directory(&git).is_err());

        git.respond(&["rev-parse", "--show-toplevel"], "/work/repo\n");
        assert_eq!(root_directory(&git).unwrap(), PathBuf::from("/work/repo"));
    }
}
