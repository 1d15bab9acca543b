//! Filesystem primitives for kitsync
//!
//! Provides content checksums, forward-slash path normalization, recursive
//! file collection, and atomic whole-file writes. Everything above this crate
//! works with normalized relative paths; conversion to the platform form
//! happens only at the filesystem call boundary.

pub mod checksum;
pub mod collect;
pub mod error;
pub mod io;
pub mod paths;

pub use checksum::{digest_bytes, digest_file};
pub use collect::{CollectedFile, IgnoreSet, collect_files, collect_files_following_links};
pub use error::{Error, Result};
pub use io::write_atomic;
pub use paths::RelPath;
