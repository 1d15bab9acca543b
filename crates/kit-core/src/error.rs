//! Error types for kit-core

use std::path::PathBuf;

/// Result type for kit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a sync run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file is expected at this path but a real directory occupies it.
    /// Never silently deleted: that risks destroying user data.
    #[error("destination is a directory where a file is expected: {path}")]
    DestinationIsDirectory { path: PathBuf },

    /// Switching a copied skill group to a symlink would discard local
    /// edits. The whole install aborts before any file is touched.
    #[error(
        "skill groups have local edits and cannot be safely replaced by symlinks: {groups:?} (use --force to overwrite)"
    )]
    UnsafeModeTransition { groups: Vec<String> },

    /// Link mode requested on a platform without unprivileged symlinks.
    #[error("symlink installation is not supported on this platform")]
    SymlinksUnsupported,

    /// Filesystem error from kit-fs
    #[error(transparent)]
    Fs(#[from] kit_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Manifest serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
