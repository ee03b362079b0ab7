//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::config_cmd::{self, PerennialCommands};
use super::output::{Output, OutputFormat};
use super::{hack, hierarchy_cmd, squash_cmd, status};
use crate::logging;
use crate::storage::PullBranchStrategy;

/// Value of `GIT_TOWN_ENV` that enables test-only overrides
const TEST_ENV: &str = "test";

#[derive(Parser)]
#[command(name = "git-town")]
#[command(author, version, about = "Branch hierarchy and sync workflows on top of git")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Print the steps a command would run without running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Runtime environment (`test` honours git-town.testing.remote-url)
    #[arg(long, global = true, env = "GIT_TOWN_ENV", hide = true)]
    pub town_env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn test_mode(&self) -> bool {
        self.town_env.as_deref() == Some(TEST_ENV)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all git-town configuration
    Config,

    /// Show or set the main branch
    MainBranch {
        /// New main branch
        branch: Option<String>,
    },

    /// Manage perennial branches
    #[command(subcommand)]
    PerennialBranches(PerennialCommands),

    /// Show or set offline mode
    Offline {
        /// true or false
        value: Option<bool>,
    },

    /// Show or set whether `hack` pushes new branches
    HackPushFlag {
        /// true or false
        value: Option<bool>,
    },

    /// Show or set how branches are updated from their tracking branch
    PullBranchStrategy {
        /// rebase or merge
        strategy: Option<PullBranchStrategy>,
    },

    /// Remove all git-town configuration from this repository
    ResetConfig,

    /// Show, set or remove the parent of a branch
    Parent {
        /// Branch to inspect or change
        branch: String,

        /// New parent
        parent: Option<String>,

        /// Remove the recorded parent
        #[arg(long, conflicts_with = "parent")]
        remove: bool,
    },

    /// List the children of a branch
    Children {
        /// Parent branch
        branch: String,
    },

    /// Show the cached ancestor chain of a branch
    Ancestors {
        /// Branch to inspect
        branch: String,

        /// Recompute the chain from parents and cache it
        #[arg(long)]
        compute: bool,
    },

    /// Clear every cached ancestor chain
    ClearAncestors,

    /// Show the branch hierarchy as a tree
    Hierarchy,

    /// Show how a branch relates to its tracking branch
    Status {
        /// Branch (defaults to the current branch)
        branch: Option<String>,
    },

    /// List local branches
    Branches,

    /// Show repository location and remotes
    Repo,

    /// Choose the author for squashing a branch
    SquashAuthor {
        /// Branch (defaults to the current branch)
        branch: Option<String>,
    },

    /// Create a new feature branch
    Hack {
        /// Name of the new branch
        branch: String,

        /// Parent branch (defaults to the main branch)
        #[arg(long, short)]
        parent: Option<String>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let output = Output::new(cli.format);
    let test_mode = cli.test_mode();

    tracing::debug!(dry_run = cli.dry_run, test_mode, "git-town starting");

    match cli.command {
        Commands::Config => config_cmd::show(&output)?,
        Commands::MainBranch { branch } => config_cmd::main_branch(&output, branch.as_deref())?,
        Commands::PerennialBranches(cmd) => config_cmd::perennial(cmd, &output)?,
        Commands::Offline { value } => config_cmd::offline(&output, value)?,
        Commands::HackPushFlag { value } => config_cmd::hack_push_flag(&output, value)?,
        Commands::PullBranchStrategy { strategy } => {
            config_cmd::pull_branch_strategy(&output, strategy)?
        }
        Commands::ResetConfig => config_cmd::reset(&output)?,

        Commands::Parent {
            branch,
            parent,
            remove,
        } => hierarchy_cmd::parent(&output, &branch, parent.as_deref(), remove)?,
        Commands::Children { branch } => hierarchy_cmd::children(&output, &branch)?,
        Commands::Ancestors { branch, compute } => {
            hierarchy_cmd::ancestors(&output, &branch, compute)?
        }
        Commands::ClearAncestors => hierarchy_cmd::clear_ancestors(&output)?,
        Commands::Hierarchy => hierarchy_cmd::tree(&output)?,

        Commands::Status { branch } => status::status(&output, branch.as_deref())?,
        Commands::Branches => status::list_branches(&output)?,
        Commands::Repo => status::repo_info(&output, test_mode)?,

        Commands::SquashAuthor { branch } => {
            squash_cmd::squash_author(&output, branch.as_deref())?
        }
        Commands::Hack { branch, parent } => {
            hack::hack(&output, &branch, parent.as_deref(), cli.dry_run)?
        }
    }

    Ok(())
}
