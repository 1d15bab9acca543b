//! Sync run orchestration
//!
//! Drives the phase sequence end to end. Fully synchronous and
//! single-threaded: one manual invocation over a few hundred files at most,
//! with interactive conflict resolution as the only suspension point.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kit_fs::{IgnoreSet, digest_file};
use tracing::debug;

use crate::diff::{self, DiffReport};
use crate::error::{Error, Result};
use crate::install::{self, Installer};
use crate::manifest::{FileDigest, Manifest, Mode};
use crate::migrate;
use crate::orphans;
use crate::resolve::{ConflictPrompt, resolve_conflicts};
use crate::source::{Category, SourceTree};

/// Options for a sync run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Overwrite conflicts and bypass the mode-transition pre-flight.
    pub force: bool,
    /// Simulate without modifying the filesystem; the manifest is not
    /// written either.
    pub dry_run: bool,
}

/// Summary of one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files (or skill groups in link mode) written or re-linked.
    pub installed: usize,
    /// Entries already correct, left untouched.
    pub skipped: usize,
    /// Conflicts detected by the diff.
    pub conflicts: usize,
    /// Conflicts the user chose to keep.
    pub kept: usize,
    /// Orphans and stale group links removed.
    pub orphans_removed: usize,
    /// Whether the manifest was synthesized from legacy symlinks.
    pub migrated: bool,
    /// Whether there was no previous state at all.
    pub fresh_install: bool,
}

impl SyncReport {
    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} installed, {} up to date, {} conflict(s) ({} kept), {} orphan(s) removed",
            self.installed, self.skipped, self.conflicts, self.kept, self.orphans_removed
        )
    }
}

/// Reconciles one source tree against one target root.
pub struct SyncEngine {
    source_root: PathBuf,
    target_root: PathBuf,
    mode: Mode,
    options: SyncOptions,
    ignore: IgnoreSet,
}

impl SyncEngine {
    pub fn new(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        mode: Mode,
        options: SyncOptions,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            mode,
            options,
            ignore: IgnoreSet::standard(),
        }
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Run the full phase sequence.
    ///
    /// # Errors
    ///
    /// Fatal cases only: unsupported platform/mode, a directory occupying a
    /// file destination, or an unsafe copy-to-link transition without
    /// `force`. Corrupt manifests and failed orphan deletions are recovered
    /// with warnings.
    pub fn sync(&self, prompt: &mut dyn ConflictPrompt) -> Result<SyncReport> {
        if self.mode == Mode::Link && !install::symlinks_supported() {
            return Err(Error::SymlinksUnsupported);
        }

        let (old, migrated) = self.load_state();
        let fresh_install = old.is_none();

        let source = SourceTree::collect(&self.source_root, &self.ignore)?;
        let diff = diff::diff(old.as_ref(), &source, &self.target_root)?;
        debug!(
            orphans = diff.orphans.len(),
            conflicts = diff.conflicts.len(),
            "diff complete"
        );

        // Every conflict goes through the resolver regardless of mode. The
        // one exception is grouped-category conflicts in link mode: the
        // installer's pre-flight refuses the whole group rather than asking
        // per file, so prompting for those would be answered twice.
        let prompted: Vec<String> = match self.mode {
            Mode::Copy => diff.conflicts.clone(),
            Mode::Link => diff
                .conflicts
                .iter()
                .filter(|rel| !Category::of_rel_path(rel.as_str()).is_some_and(|c| c.grouped()))
                .cloned()
                .collect(),
        };
        let kept = resolve_conflicts(&prompted, prompt, self.options.force);

        let installer = Installer::new(
            &source,
            &self.target_root,
            self.mode,
            &self.ignore,
            self.options.force,
            self.options.dry_run,
        );
        let outcome = installer.install(&kept)?;

        let orphans_removed = orphans::remove_orphans(
            &diff.orphans,
            &source,
            &self.target_root,
            self.mode,
            self.options.dry_run,
        );

        if !self.options.dry_run {
            self.write_manifest(&source, &kept)?;
        }

        Ok(SyncReport {
            installed: outcome.installed,
            skipped: outcome.skipped,
            conflicts: diff.conflicts.len(),
            kept: kept.len(),
            orphans_removed,
            migrated,
            fresh_install,
        })
    }

    /// Diff-only view of the current state; mutates nothing.
    pub fn status(&self) -> Result<DiffReport> {
        let (old, _) = self.load_state();
        let source = SourceTree::collect(&self.source_root, &self.ignore)?;
        diff::diff(old.as_ref(), &source, &self.target_root)
    }

    fn load_state(&self) -> (Option<Manifest>, bool) {
        if let Some(manifest) = Manifest::load(&self.target_root) {
            return (Some(manifest), false);
        }
        match migrate::scan_legacy(&self.source_root, &self.target_root, &self.ignore) {
            Some(manifest) => (Some(manifest), true),
            None => (None, false),
        }
    }

    /// Recompute digests for the new state and persist it.
    ///
    /// Copy mode digests destination content, so files the user kept record
    /// their on-disk state as the next baseline. Link mode digests source
    /// content, the destination being only a pointer, except for kept paths
    /// where the destination is still the user's real file.
    fn write_manifest(&self, source: &SourceTree, kept: &HashSet<String>) -> Result<()> {
        let mut manifest = Manifest::new(self.mode);
        for file in source.files() {
            let rel = file.rel_path.as_str();
            let digest = match self.mode {
                Mode::Copy => digest_file(&file.rel_path.under(&self.target_root))?,
                Mode::Link if kept.contains(rel) => {
                    digest_file(&file.rel_path.under(&self.target_root))?
                }
                Mode::Link => digest_file(&file.abs_path)?,
            };
            manifest
                .files
                .insert(file.rel_path.as_str().to_string(), FileDigest::Checksum(digest));
        }
        manifest.save(&self.target_root)?;
        Ok(())
    }
}
