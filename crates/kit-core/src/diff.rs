//! Three-way diff between manifest baseline, on-disk content, and source
//!
//! Produces the orphan and conflict sets for a run. Conflicts exist only in
//! copy mode: a link-mode destination resolves to the live source and is
//! always current.

use std::path::Path;

use kit_fs::{RelPath, digest_file};

use crate::error::Result;
use crate::manifest::{Manifest, Mode};
use crate::source::SourceTree;

/// Orphans and conflicts derived for one run. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    /// Paths recorded in the old manifest that the source no longer
    /// produces and that are still physically present at the target.
    pub orphans: Vec<String>,
    /// Paths whose on-disk content diverged from both the recorded
    /// baseline and the current source.
    pub conflicts: Vec<String>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.orphans.is_empty() && self.conflicts.is_empty()
    }
}

/// Classification of one tracked file in copy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Disk still matches the recorded baseline.
    Current,
    /// Disk diverged from the baseline but matches the current source:
    /// upstream converged with the local edit, no conflict.
    Converged,
    /// Disk diverged from both baseline and source.
    Conflict,
}

/// Decision table over (baseline-vs-disk, disk-vs-source) agreement.
pub fn classify(baseline_matches_disk: bool, disk_matches_source: bool) -> FileState {
    match (baseline_matches_disk, disk_matches_source) {
        (true, _) => FileState::Current,
        (false, true) => FileState::Converged,
        (false, false) => FileState::Conflict,
    }
}

/// Compare the old manifest (or absent) against the freshly collected
/// source set and the target tree.
pub fn diff(
    old: Option<&Manifest>,
    source: &SourceTree,
    target_root: &Path,
) -> Result<DiffReport> {
    let mut report = DiffReport::default();
    let Some(old) = old else {
        // Fresh install: nothing tracked, nothing to orphan or conflict.
        return Ok(report);
    };

    for rel in old.files.keys() {
        if source.contains(rel) {
            continue;
        }
        // Only report what is still physically present; a dangling symlink
        // counts, so use symlink_metadata.
        let dest = RelPath::new(rel.as_str()).under(target_root);
        if std::fs::symlink_metadata(&dest).is_ok() {
            report.orphans.push(rel.clone());
        }
    }

    if old.mode == Mode::Copy {
        for file in source.files() {
            let rel = file.rel_path.as_str();
            let Some(baseline) = old.files.get(rel) else {
                continue;
            };
            let dest = file.rel_path.under(target_root);
            // Conflicts apply to regular files only. Absent destinations are
            // fresh writes; symlinks (dangling or not) are safely replaceable.
            let Ok(meta) = std::fs::symlink_metadata(&dest) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }

            let disk = digest_file(&dest)?;
            if baseline.matches(&disk) {
                continue;
            }
            let src = digest_file(&file.abs_path)?;
            if classify(false, disk == src) == FileState::Conflict {
                report.conflicts.push(rel.to_string());
            }
        }
    }

    Ok(report)
}
