//! Persisted installation manifest
//!
//! One manifest per target root, read at run start and wholly replaced at
//! run end. A manifest that exists but fails to parse is treated as absent
//! (fresh install) with a warning, never as a fatal error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Manifest file name, stored directly under the target root.
pub const MANIFEST_FILENAME: &str = ".kitsync-manifest.json";

/// Current manifest format version.
pub const MANIFEST_VERSION: &str = "1";

/// Sentinel stored for entries whose content could not be read during legacy
/// migration. Never equal to a computed digest, so the first post-migration
/// comparison always reports a difference.
const MIGRATED_SENTINEL: &str = "migrated";

/// Delivery mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Independent file copies in the target tree.
    Copy,
    /// Symlinks (per-file or per-skill-group) pointing back at the source.
    Link,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Copy => write!(f, "copy"),
            Mode::Link => write!(f, "link"),
        }
    }
}

/// Recorded content fingerprint for one installed file.
///
/// An explicit tagged variant rather than a bare string: the migration
/// sentinel must never compare equal to a freshly computed digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileDigest {
    /// Truncated content hash, see [`kit_fs::digest_bytes`].
    Checksum(String),
    /// Entry reconstructed by legacy migration from unreadable content.
    Migrated,
}

impl FileDigest {
    /// Whether this digest matches a freshly computed one. The sentinel
    /// matches nothing.
    pub fn matches(&self, computed: &str) -> bool {
        match self {
            FileDigest::Checksum(c) => c == computed,
            FileDigest::Migrated => false,
        }
    }
}

impl From<String> for FileDigest {
    fn from(s: String) -> Self {
        if s == MIGRATED_SENTINEL {
            FileDigest::Migrated
        } else {
            FileDigest::Checksum(s)
        }
    }
}

impl From<FileDigest> for String {
    fn from(d: FileDigest) -> Self {
        match d {
            FileDigest::Checksum(c) => c,
            FileDigest::Migrated => MIGRATED_SENTINEL.to_string(),
        }
    }
}

/// Persisted record of the last-installed file set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Format version, currently [`MANIFEST_VERSION`].
    pub version: String,
    /// RFC 3339 timestamp of the install that wrote this manifest.
    #[serde(rename = "installedAt")]
    pub installed_at: String,
    /// Delivery mode of that install. Determines how digests are
    /// interpreted: source-side content in link mode, on-disk content in
    /// copy mode.
    pub mode: Mode,
    /// Forward-slash relative path -> content fingerprint.
    pub files: BTreeMap<String, FileDigest>,
}

impl Manifest {
    /// Create an empty manifest for `mode`, stamped now.
    pub fn new(mode: Mode) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            installed_at: chrono::Utc::now().to_rfc3339(),
            mode,
            files: BTreeMap::new(),
        }
    }

    /// Path of the manifest file under `target_root`.
    pub fn path_for(target_root: &Path) -> PathBuf {
        target_root.join(MANIFEST_FILENAME)
    }

    /// Read the last installed state, or `None` if there is none.
    ///
    /// A manifest that exists but fails to parse is reported with a warning
    /// and treated as absent; the run proceeds as a fresh install.
    pub fn load(target_root: &Path) -> Option<Self> {
        let path = Self::path_for(target_root);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "manifest is corrupt, treating as fresh install"
                );
                None
            }
        }
    }

    /// Persist this manifest, wholly replacing any previous one.
    ///
    /// Whole-file replacement via atomic rename is the only transactionality
    /// offered: a crash mid-write leaves the previous manifest intact.
    pub fn save(&self, target_root: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        kit_fs::write_atomic(&Self::path_for(target_root), content.as_bytes())?;
        Ok(())
    }
}
