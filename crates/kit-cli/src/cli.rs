//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// kitsync - Install assistant commands, agents, and skills from a source tree
#[derive(Parser, Debug)]
#[command(name = "kitsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Delivery mechanism for installed files
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Write independent file copies
    Copy,
    /// Symlink back at the source tree
    Link,
}

impl From<ModeArg> for kit_core::Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Copy => kit_core::Mode::Copy,
            ModeArg::Link => kit_core::Mode::Link,
        }
    }
}

/// Target scope: user-global or project-local install root
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Install into the user-global root (~/.claude). The default.
    #[arg(long, conflicts_with = "project")]
    pub user: bool,

    /// Install into the project-local root (./.claude)
    #[arg(long)]
    pub project: bool,

    /// Source tree to install from (defaults to the current directory)
    #[arg(long)]
    pub source: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Reconcile the target root with the source tree
    ///
    /// Examples:
    ///   kitsync sync                       # copy into ~/.claude
    ///   kitsync sync --project --mode link # symlink into ./.claude
    ///   kitsync sync --force               # overwrite conflicts, skip checks
    Sync {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Delivery mechanism
        #[arg(long, value_enum, default_value = "copy")]
        mode: ModeArg,

        /// Overwrite conflicts and bypass the mode-transition safety check
        #[arg(long)]
        force: bool,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show pending conflicts and orphans without changing anything
    Status {
        #[command(flatten)]
        scope: ScopeArgs,
    },
}
