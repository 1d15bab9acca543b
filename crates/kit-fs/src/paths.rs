//! Normalized relative path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A relative path normalized to use forward slashes internally.
///
/// Manifest keys and all in-memory bookkeeping use this form regardless of
/// host platform; conversion to the native separator happens only when a
/// filesystem call is made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl RelPath {
    /// Create a new RelPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Resolve this relative path under `root`, producing a native PathBuf
    /// suitable for I/O.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for segment in self.inner.split('/').filter(|s| !s.is_empty()) {
            out.push(segment);
        }
        out
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if self.inner.is_empty() {
            Self {
                inner: segment_normalized,
            }
        } else {
            Self {
                inner: format!("{}/{}", self.inner.trim_end_matches('/'), segment_normalized),
            }
        }
    }

    /// Get the parent path, if any.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        let idx = trimmed.rfind('/')?;
        Some(Self {
            inner: trimmed[..idx].to_string(),
        })
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next()
    }

    /// Get the leading path component.
    pub fn first_component(&self) -> Option<&str> {
        self.inner.split('/').next().filter(|s| !s.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for RelPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
