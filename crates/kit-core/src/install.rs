//! Applies copy or link operations to the target tree
//!
//! Every operation is idempotent: re-running against an unchanged source and
//! an already-correct target performs zero writes.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use kit_fs::{IgnoreSet, collect_files};
use tracing::debug;

use crate::error::{Error, Result};
use crate::manifest::Mode;
use crate::source::{Category, SourceTree};

/// File extensions that get the executable bit after a copy install.
const SCRIPT_EXTENSIONS: &[&str] = &["sh", "py"];

/// Whether this platform supports unprivileged symlink creation.
pub fn symlinks_supported() -> bool {
    cfg!(unix)
}

/// Counts from one install pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Files (or skill groups, in link mode) written or re-linked.
    pub installed: usize,
    /// Entries already correct on disk, left untouched.
    pub skipped: usize,
}

/// Applies one delivery mode to the target tree.
pub struct Installer<'a> {
    source: &'a SourceTree,
    target_root: &'a Path,
    mode: Mode,
    ignore: &'a IgnoreSet,
    force: bool,
    dry_run: bool,
}

impl<'a> Installer<'a> {
    pub fn new(
        source: &'a SourceTree,
        target_root: &'a Path,
        mode: Mode,
        ignore: &'a IgnoreSet,
        force: bool,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            target_root,
            mode,
            ignore,
            force,
            dry_run,
        }
    }

    /// Run the install. `kept` holds the relative paths the conflict
    /// resolver decided to leave alone.
    pub fn install(&self, kept: &HashSet<String>) -> Result<InstallOutcome> {
        match self.mode {
            Mode::Copy => self.install_copies(kept),
            Mode::Link => self.install_links(kept),
        }
    }

    fn install_copies(&self, kept: &HashSet<String>) -> Result<InstallOutcome> {
        let mut outcome = InstallOutcome::default();

        // A previous link-mode install may have left group-level symlinks
        // standing in for skill directories. Writing through one would land
        // copies inside the source tree, so drop them first. Under dry-run
        // the links stay, but files behind them still count as pending.
        let mut linked_groups: Vec<String> = Vec::new();
        for group in self.source.skill_groups() {
            let dest = self
                .target_root
                .join(Category::Skills.dir_name())
                .join(&group);
            if let Ok(meta) = fs::symlink_metadata(&dest)
                && meta.file_type().is_symlink()
            {
                if !self.dry_run {
                    fs::remove_file(&dest)?;
                    debug!(group = %group, "removed group symlink before copy install");
                }
                linked_groups.push(group);
            }
        }

        for file in self.source.files() {
            let rel = file.rel_path.as_str();
            if kept.contains(rel) {
                continue;
            }
            let behind_group_link = file.category.grouped()
                && file
                    .rel_path
                    .as_str()
                    .split('/')
                    .nth(1)
                    .is_some_and(|g| linked_groups.iter().any(|l| l == g));

            let dest = file.rel_path.under(self.target_root);
            let meta = if behind_group_link {
                None
            } else {
                fs::symlink_metadata(&dest).ok()
            };

            if let Some(meta) = &meta
                && meta.is_dir()
            {
                return Err(Error::DestinationIsDirectory { path: dest });
            }

            let content = fs::read(&file.abs_path)?;
            let is_symlink = meta
                .as_ref()
                .is_some_and(|m| m.file_type().is_symlink());

            // Byte-equal regular files are left alone to avoid mtime churn;
            // a symlink is always replaced by a real file.
            if !is_symlink
                && meta.is_some()
                && fs::read(&dest).map(|d| d == content).unwrap_or(false)
            {
                outcome.skipped += 1;
                continue;
            }

            if self.dry_run {
                debug!(path = rel, "[dry-run] would copy");
                outcome.installed += 1;
                continue;
            }

            if is_symlink {
                fs::remove_file(&dest)?;
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &content)?;
            if file
                .rel_path
                .extension()
                .is_some_and(|e| SCRIPT_EXTENSIONS.contains(&e))
            {
                set_executable(&dest)?;
            }
            debug!(path = rel, "copied");
            outcome.installed += 1;
        }

        Ok(outcome)
    }

    fn install_links(&self, kept: &HashSet<String>) -> Result<InstallOutcome> {
        let mut outcome = InstallOutcome::default();

        // All-or-nothing pre-flight: a previously copied skill group may
        // carry local edits, and replacing it with a symlink would destroy
        // them. Verify every group before touching any file.
        if !self.force {
            let mut diverged = Vec::new();
            for group in self.source.skill_groups() {
                let dest = self
                    .target_root
                    .join(Category::Skills.dir_name())
                    .join(&group);
                let Ok(meta) = fs::symlink_metadata(&dest) else {
                    continue;
                };
                if meta.is_dir()
                    && !meta.file_type().is_symlink()
                    && !self.group_matches_source(&group, &dest)?
                {
                    diverged.push(group);
                }
            }
            if !diverged.is_empty() {
                return Err(Error::UnsafeModeTransition { groups: diverged });
            }
        }

        // Per-file symlinks for the flat categories. A kept path is the
        // user's own file and stays a regular file.
        for file in self.source.files() {
            if file.category.grouped() {
                continue;
            }
            let rel = file.rel_path.as_str();
            if kept.contains(rel) {
                continue;
            }
            let dest = file.rel_path.under(self.target_root);
            let meta = fs::symlink_metadata(&dest).ok();

            if let Some(meta) = &meta {
                if meta.file_type().is_symlink() {
                    if fs::read_link(&dest).map(|t| t == file.abs_path).unwrap_or(false) {
                        outcome.skipped += 1;
                        continue;
                    }
                } else if meta.is_dir() {
                    return Err(Error::DestinationIsDirectory { path: dest });
                }
            }

            if self.dry_run {
                debug!(path = rel, "[dry-run] would link");
                outcome.installed += 1;
                continue;
            }

            if meta.is_some() {
                fs::remove_file(&dest)?;
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            symlink(&file.abs_path, &dest)?;
            debug!(path = rel, "linked");
            outcome.installed += 1;
        }

        // One directory-level symlink per skill group: a single link tracks
        // every contained file as the source evolves, and bookkeeping is one
        // operation per group regardless of file count.
        for group in self.source.skill_groups() {
            let src_dir = self.source.skill_group_dir(&group);
            let dest = self
                .target_root
                .join(Category::Skills.dir_name())
                .join(&group);
            let meta = fs::symlink_metadata(&dest).ok();

            if let Some(meta) = &meta
                && meta.file_type().is_symlink()
                && fs::read_link(&dest).map(|t| t == src_dir).unwrap_or(false)
            {
                outcome.skipped += 1;
                continue;
            }

            if self.dry_run {
                debug!(group = %group, "[dry-run] would link group");
                outcome.installed += 1;
                continue;
            }

            if let Some(meta) = &meta {
                if meta.file_type().is_symlink() {
                    fs::remove_file(&dest)?;
                } else if meta.is_dir() {
                    // Verified byte-identical by the pre-flight (or forced).
                    fs::remove_dir_all(&dest)?;
                } else {
                    fs::remove_file(&dest)?;
                }
            }
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            symlink(&src_dir, &dest)?;
            debug!(group = %group, "linked group");
            outcome.installed += 1;
        }

        Ok(outcome)
    }

    /// Byte-for-byte comparison of an installed skill group directory
    /// against its source. Extra files, missing files, unreadable files, or
    /// differing content all count as divergence.
    fn group_matches_source(&self, group: &str, dest_dir: &Path) -> Result<bool> {
        let prefix = format!("{}/{}/", Category::Skills.dir_name(), group);
        let source_files: BTreeMap<String, &Path> = self
            .source
            .files()
            .iter()
            .filter_map(|f| {
                let suffix = f.rel_path.as_str().strip_prefix(&prefix)?;
                Some((suffix.to_string(), f.abs_path.as_path()))
            })
            .collect();

        let dest_files = collect_files(dest_dir, "", self.ignore)?;
        if dest_files.len() != source_files.len() {
            return Ok(false);
        }
        for found in dest_files {
            let Some(src) = source_files.get(found.rel.as_str()) else {
                return Ok(false);
            };
            let Ok(dest_content) = fs::read(&found.abs) else {
                return Ok(false);
            };
            if fs::read(src).map(|s| s != dest_content).unwrap_or(true) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn symlink(_src: &Path, _dst: &Path) -> std::io::Result<()> {
    // Link mode is rejected before any work begins on these platforms.
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks unsupported",
    ))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
