//! Truncated SHA-256 content digests
//!
//! Digests are used for change detection only, never as a security
//! primitive; 64 bits of hex are plenty to tell "same" from "different"
//! across a few hundred files.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Length in hex characters of a truncated digest
const DIGEST_HEX_LEN: usize = 16;

/// Compute the truncated SHA-256 digest of a byte slice.
///
/// Returns a fixed-length lowercase hex string.
pub fn digest_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let full = format!("{:x}", hasher.finalize());
    full[..DIGEST_HEX_LEN].to_string()
}

/// Compute the truncated SHA-256 digest of a file's contents.
///
/// Reads through symlinks, so a link-mode destination digests the content
/// it currently resolves to.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn digest_file(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(digest_bytes(&content))
}
