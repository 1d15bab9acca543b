//! Recursive file collection

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths::RelPath;

/// Entry names and suffixes excluded from collection.
///
/// Built once at startup and passed into each component, never a mutable
/// global.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    names: BTreeSet<&'static str>,
    suffixes: Vec<&'static str>,
}

impl IgnoreSet {
    /// The standard exclusion set: version-control metadata, OS metadata,
    /// bytecode caches.
    pub fn standard() -> Self {
        Self {
            names: [".git", ".svn", ".hg", ".DS_Store", "Thumbs.db", "__pycache__"]
                .into_iter()
                .collect(),
            suffixes: vec![".pyc"],
        }
    }

    /// Whether an entry name should be skipped.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.names.contains(name) || self.suffixes.iter().any(|s| name.ends_with(s))
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// A file found by collection: normalized relative path plus the absolute
/// path it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub rel: RelPath,
    pub abs: PathBuf,
}

/// Recursively enumerate every file under `root`, keyed by `prefix`-relative
/// normalized paths.
///
/// A missing `root` yields the empty set rather than an error; payload
/// directories are optional. Directory symlinks are not descended into —
/// the source tree is authoritative on the main path.
///
/// Results are sorted by relative path.
pub fn collect_files(root: &Path, prefix: &str, ignore: &IgnoreSet) -> Result<Vec<CollectedFile>> {
    walk(root, prefix, ignore, false)
}

/// Like [`collect_files`], but descends through directory symlinks.
///
/// Used only by legacy migration, which has to reach files through the
/// predecessor tool's directory-level links.
pub fn collect_files_following_links(
    root: &Path,
    prefix: &str,
    ignore: &IgnoreSet,
) -> Result<Vec<CollectedFile>> {
    walk(root, prefix, ignore, true)
}

fn walk(
    root: &Path,
    prefix: &str,
    ignore: &IgnoreSet,
    follow_dir_links: bool,
) -> Result<Vec<CollectedFile>> {
    let mut out = Vec::new();
    if !root.exists() {
        return Ok(out);
    }
    walk_into(root, &RelPath::new(prefix), ignore, follow_dir_links, &mut out)?;
    out.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(out)
}

fn walk_into(
    dir: &Path,
    rel: &RelPath,
    ignore: &IgnoreSet,
    follow_dir_links: bool,
    out: &mut Vec<CollectedFile>,
) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if ignore.is_ignored(&name) {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        let child_rel = rel.join(&name);

        if file_type.is_dir() {
            walk_into(&path, &child_rel, ignore, follow_dir_links, out)?;
        } else if file_type.is_symlink() && follow_dir_links && path.is_dir() {
            walk_into(&path, &child_rel, ignore, follow_dir_links, out)?;
        } else {
            out.push(CollectedFile {
                rel: child_rel,
                abs: path,
            });
        }
    }
    Ok(())
}
