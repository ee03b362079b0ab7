//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Config | Settings stored in git config | `config`, `main-branch`, `offline` |
//! | Hierarchy | Parents, children, ancestors | `parent`, `children`, `hierarchy` |
//! | State | What git reports right now | `status`, `branches`, `repo` |
//! | Workflow | Multi-step git operations | `hack`, `squash-author` |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Dry Run
//!
//! `--dry-run` prints the steps of a workflow command without running
//! them. Read-only git queries still run.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod config_cmd;
mod hack;
mod hierarchy_cmd;
mod output;
mod squash_cmd;
mod status;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
