//! kitsync CLI
//!
//! Installs assistant payload (commands, agents, skills) from a source tree
//! into a user-global or project-local root.

mod cli;
mod commands;
mod error;
mod prompt;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Sync {
            scope,
            mode,
            force,
            dry_run,
        }) => commands::run_sync(&scope, mode.into(), force, dry_run),
        Some(Commands::Status { scope }) => commands::run_status(&scope),
        None => {
            println!("{} local asset installer", "kitsync".green().bold());
            println!();
            println!("Run {} for available commands.", "kitsync --help".cyan());
            Ok(())
        }
    }
}
