//! Removal of files the source no longer produces
//!
//! Best-effort: a failed deletion is logged and the rest of the cleanup
//! continues. Empty parent directories are pruned afterwards, deepest
//! first, but the fixed category directories always survive.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use kit_fs::RelPath;
use tracing::{debug, warn};

use crate::manifest::Mode;
use crate::source::{Category, SourceTree};

/// Delete each orphan and prune emptied directories.
///
/// In link mode, additionally sweeps group-level symlinks whose source
/// directory was deleted upstream. Returns how many entries were removed.
pub fn remove_orphans(
    orphans: &[String],
    source: &SourceTree,
    target_root: &Path,
    mode: Mode,
    dry_run: bool,
) -> usize {
    let mut removed = 0;
    let mut parents: BTreeSet<PathBuf> = BTreeSet::new();

    for rel in orphans {
        let rel = RelPath::new(rel.as_str());
        let dest = rel.under(target_root);
        if dry_run {
            debug!(path = %rel, "[dry-run] would remove orphan");
            removed += 1;
            continue;
        }
        // Files and symlinks are deleted identically; dangling links too.
        match fs::remove_file(&dest) {
            Ok(()) => {
                debug!(path = %rel, "removed orphan");
                removed += 1;
                collect_parents(&rel, target_root, &mut parents);
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "failed to remove orphan, continuing");
            }
        }
    }

    if mode == Mode::Link {
        removed += sweep_stale_group_links(source, target_root, dry_run);
    }

    if !dry_run {
        prune_empty_dirs(parents, target_root);
    }

    removed
}

/// Every directory strictly between the target root and the file.
fn collect_parents(rel: &RelPath, target_root: &Path, parents: &mut BTreeSet<PathBuf>) {
    let mut current = rel.parent();
    while let Some(dir) = current {
        parents.insert(dir.under(target_root));
        current = dir.parent();
    }
}

/// Remove emptied directories, deepest first. The category roots are never
/// removed, even when empty.
fn prune_empty_dirs(parents: BTreeSet<PathBuf>, target_root: &Path) {
    let protected: Vec<PathBuf> = Category::ALL
        .iter()
        .map(|c| target_root.join(c.dir_name()))
        .collect();

    let mut dirs: Vec<PathBuf> = parents.into_iter().collect();
    dirs.sort_by_key(|p| std::cmp::Reverse(p.components().count()));

    for dir in dirs {
        if protected.contains(&dir) || dir == target_root {
            continue;
        }
        let is_empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty && fs::remove_dir(&dir).is_ok() {
            debug!(path = %dir.display(), "pruned empty directory");
        }
    }
}

/// Remove group-level symlinks that point into the source tree but whose
/// target no longer exists (the whole group was deleted upstream). Links
/// the user placed themselves, aimed anywhere else, are not ours to touch,
/// dangling or not.
fn sweep_stale_group_links(source: &SourceTree, target_root: &Path, dry_run: bool) -> usize {
    let skills_dir = target_root.join(Category::Skills.dir_name());
    let Ok(entries) = fs::read_dir(&skills_dir) else {
        return 0;
    };

    let canonical_src =
        fs::canonicalize(source.root()).unwrap_or_else(|_| source.root().to_path_buf());
    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if !meta.file_type().is_symlink() {
            continue;
        }
        // exists() resolves the link; a live target means nothing to sweep.
        if path.exists() {
            continue;
        }
        let into_source = fs::read_link(&path)
            .map(|t| t.starts_with(source.root()) || t.starts_with(&canonical_src))
            .unwrap_or(false);
        if !into_source {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if dry_run {
            debug!(group = %name, "[dry-run] would remove stale group link");
            removed += 1;
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(group = %name, "removed stale group link");
                removed += 1;
            }
            Err(e) => {
                warn!(group = %name, error = %e, "failed to remove stale group link");
            }
        }
    }
    removed
}
