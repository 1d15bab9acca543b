//! Legacy migration scanner
//!
//! The predecessor tool installed symlinks into the category directories and
//! kept no manifest. When no manifest exists, this scanner reconstructs a
//! synthetic one by following every symlink that resolves back into the
//! source tree, so the first kitsync run can diff against *something* rather
//! than treating a populated target as a fresh install.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use kit_fs::{IgnoreSet, RelPath, collect_files_following_links, digest_file};
use tracing::{debug, warn};

use crate::manifest::{FileDigest, Manifest, Mode};
use crate::source::Category;

/// Reconstruct a manifest from predecessor symlinks, or `None` if there are
/// none and the run should proceed as a fresh install.
///
/// File-level symlinks yield one entry each; directory-level symlinks expand
/// to one entry per file reached through them. Unreadable content gets the
/// migration sentinel, which never equals a computed digest, so the first
/// post-migration comparison reports a difference instead of silently
/// matching.
pub fn scan_legacy(source_root: &Path, target_root: &Path, ignore: &IgnoreSet) -> Option<Manifest> {
    // Without a resolvable source root no symlink can point into it.
    let canonical_src = fs::canonicalize(source_root).ok()?;

    let mut files = BTreeMap::new();
    for category in Category::ALL {
        let dir = target_root.join(category.dir_name());
        if dir.is_dir() {
            walk_for_links(
                &dir,
                &RelPath::new(category.dir_name()),
                &canonical_src,
                ignore,
                &mut files,
            );
        }
    }

    if files.is_empty() {
        return None;
    }

    debug!(entries = files.len(), "reconstructed manifest from legacy symlinks");
    let mut manifest = Manifest::new(Mode::Link);
    manifest.files = files;
    Some(manifest)
}

fn walk_for_links(
    dir: &Path,
    rel: &RelPath,
    canonical_src: &Path,
    ignore: &IgnoreSet,
    files: &mut BTreeMap<String, FileDigest>,
) {
    let Ok(entries) = fs::read_dir(dir) else {
        warn!(path = %dir.display(), "cannot read legacy directory, skipping");
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if ignore.is_ignored(&name) {
            continue;
        }
        let path = entry.path();
        let child_rel = rel.join(&name);
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_symlink() {
            record_link(&path, &child_rel, canonical_src, ignore, files);
        } else if file_type.is_dir() {
            walk_for_links(&path, &child_rel, canonical_src, ignore, files);
        }
        // Regular files were not placed by the predecessor; not migrated.
    }
}

fn record_link(
    path: &Path,
    rel: &RelPath,
    canonical_src: &Path,
    ignore: &IgnoreSet,
    files: &mut BTreeMap<String, FileDigest>,
) {
    match fs::canonicalize(path) {
        Ok(resolved) if resolved.starts_with(canonical_src) => {
            if resolved.is_dir() {
                // One entry per file reached through the directory link.
                match collect_files_following_links(path, rel.as_str(), ignore) {
                    Ok(found) => {
                        for f in found {
                            files.insert(f.rel.as_str().to_string(), digest_or_sentinel(&f.abs));
                        }
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "cannot expand legacy directory link");
                    }
                }
            } else {
                files.insert(rel.as_str().to_string(), digest_or_sentinel(path));
            }
        }
        Ok(_) => {
            // Points somewhere else entirely; not ours to migrate.
        }
        Err(_) => {
            // Dangling. If the raw link target aims at the source tree it is
            // still a legacy entry, just unreadable.
            if let Ok(target) = fs::read_link(path)
                && points_into(&target, canonical_src)
            {
                files.insert(rel.as_str().to_string(), FileDigest::Migrated);
            }
        }
    }
}

fn points_into(target: &Path, canonical_src: &Path) -> bool {
    target.starts_with(canonical_src)
        || fs::canonicalize(target.parent().unwrap_or(target))
            .map(|p| p.starts_with(canonical_src))
            .unwrap_or(false)
}

fn digest_or_sentinel(path: &Path) -> FileDigest {
    match digest_file(path) {
        Ok(d) => FileDigest::Checksum(d),
        Err(_) => FileDigest::Migrated,
    }
}
