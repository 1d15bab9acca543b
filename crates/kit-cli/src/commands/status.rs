//! Status command implementation

use colored::Colorize;
use kit_core::{Mode, SyncEngine, SyncOptions};

use super::{resolve_source_root, resolve_target_root};
use crate::cli::ScopeArgs;
use crate::error::Result;

/// Show pending conflicts and orphans without changing anything.
pub fn run_status(scope: &ScopeArgs) -> Result<()> {
    let source_root = resolve_source_root(scope)?;
    let target_root = resolve_target_root(scope)?;

    // Mode only matters for mutation; status never mutates.
    let engine = SyncEngine::new(source_root, target_root, Mode::Copy, SyncOptions::default());
    let diff = engine.status()?;

    if diff.is_empty() {
        println!("{} Target is in sync with the source.", "OK".green().bold());
        return Ok(());
    }

    if !diff.conflicts.is_empty() {
        println!("{} Locally modified files:", "CONFLICTS".yellow().bold());
        for rel in &diff.conflicts {
            println!("   {} {}", "!".yellow(), rel.cyan());
        }
    }
    if !diff.orphans.is_empty() {
        println!("{} No longer produced by the source:", "ORPHANS".yellow().bold());
        for rel in &diff.orphans {
            println!("   {} {}", "-".yellow(), rel.cyan());
        }
    }
    println!();
    println!("Run {} to reconcile.", "kitsync sync".cyan());
    Ok(())
}
