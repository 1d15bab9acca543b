//! Per-file conflict resolution policy
//!
//! The resolver owns the overwrite-vs-keep policy and its `overwrite all` /
//! `keep all` latches; what it never owns is the terminal. Interactivity is
//! supplied by the caller through [`ConflictPrompt`], so the core stays
//! testable and the CLI keeps its prompt rendering.

use std::collections::HashSet;

use tracing::warn;

/// One answer to a conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Overwrite this file with the source version.
    Overwrite,
    /// Keep the local version of this file.
    Keep,
    /// Overwrite this and every remaining conflict.
    OverwriteAll,
    /// Keep this and every remaining conflict.
    KeepAll,
}

impl Decision {
    /// Parse a single-character answer token.
    ///
    /// `o` overwrite, `k` keep, `a` overwrite all, `s` keep all. Anything
    /// unrecognized resolves to overwrite: the tool is idempotent and
    /// re-runnable, so failing open is the cheaper mistake.
    pub fn parse(token: &str) -> Decision {
        match token.trim() {
            "k" => Decision::Keep,
            "a" => Decision::OverwriteAll,
            "s" => Decision::KeepAll,
            _ => Decision::Overwrite,
        }
    }
}

/// Source of per-file decisions, implemented by the CLI over stdin.
pub trait ConflictPrompt {
    /// Whether a controlling terminal is available for questions.
    fn is_interactive(&self) -> bool;

    /// Ask what to do about one conflicting file.
    fn ask(&mut self, rel_path: &str) -> Decision;
}

/// Resolve each conflict to overwrite or keep.
///
/// Returns the set of relative paths to keep. Under `force`, or when the
/// prompt reports no terminal, every conflict resolves to overwrite with a
/// single warning naming the reason and count.
pub fn resolve_conflicts(
    conflicts: &[String],
    prompt: &mut dyn ConflictPrompt,
    force: bool,
) -> HashSet<String> {
    let mut kept = HashSet::new();
    if conflicts.is_empty() {
        return kept;
    }

    if force {
        warn!(count = conflicts.len(), "overwriting all conflicts (--force)");
        return kept;
    }
    if !prompt.is_interactive() {
        warn!(
            count = conflicts.len(),
            "no terminal available, overwriting all conflicts"
        );
        return kept;
    }

    let mut overwrite_all = false;
    let mut keep_all = false;
    for rel in conflicts {
        if overwrite_all {
            continue;
        }
        if keep_all {
            kept.insert(rel.clone());
            continue;
        }
        match prompt.ask(rel) {
            Decision::Overwrite => {}
            Decision::Keep => {
                kept.insert(rel.clone());
            }
            Decision::OverwriteAll => overwrite_all = true,
            Decision::KeepAll => {
                kept.insert(rel.clone());
                keep_all = true;
            }
        }
    }
    kept
}
