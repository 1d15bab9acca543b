//! Sync command implementation

use colored::Colorize;
use kit_core::{Mode, SyncEngine, SyncOptions};

use super::{resolve_source_root, resolve_target_root};
use crate::cli::ScopeArgs;
use crate::error::Result;
use crate::prompt::StdinPrompt;

/// Run a full reconcile of the target root against the source tree.
pub fn run_sync(scope: &ScopeArgs, mode: Mode, force: bool, dry_run: bool) -> Result<()> {
    let source_root = resolve_source_root(scope)?;
    let target_root = resolve_target_root(scope)?;

    println!(
        "{} Syncing {} into {} ({} mode{})",
        "=>".blue().bold(),
        source_root.display().to_string().cyan(),
        target_root.display().to_string().cyan(),
        mode,
        if dry_run { ", dry run" } else { "" }
    );

    let engine = SyncEngine::new(source_root, target_root, mode, SyncOptions { force, dry_run });
    let report = engine.sync(&mut StdinPrompt)?;

    if report.migrated {
        println!(
            "{} Migrated state from a legacy symlink install.",
            "NOTE".yellow().bold()
        );
    } else if report.fresh_install {
        println!("{} No previous install found, starting fresh.", "NOTE".dimmed());
    }

    println!("{} {}", "OK".green().bold(), report.summary());
    Ok(())
}
