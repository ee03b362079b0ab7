//! git-town - Branch hierarchy and sync workflows on top of git

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = git_town::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
