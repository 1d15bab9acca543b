//! Shared test fixtures for kitsync
//!
//! [`TestTree`] gives every test a temporary source tree and target root
//! with helper methods for setup and assertion.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary source/target directory pair for sync scenarios.
///
/// # Example
///
/// ```rust,no_run
/// use kit_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.source_file("commands/a.md", "X");
/// tree.assert_target_absent("commands/a.md");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty source/target pair.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("TestTree: failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("source")).unwrap();
        fs::create_dir_all(temp_dir.path().join("target")).unwrap();
        Self { temp_dir }
    }

    /// The source tree root.
    pub fn source_root(&self) -> PathBuf {
        self.temp_dir.path().join("source")
    }

    /// The target (install) root.
    pub fn target_root(&self) -> PathBuf {
        self.temp_dir.path().join("target")
    }

    /// Write a file under the source root, creating parent directories.
    pub fn source_file(&self, rel: &str, content: &str) {
        write_file(&self.source_root().join(rel), content);
    }

    /// Write a file under the target root, creating parent directories.
    pub fn target_file(&self, rel: &str, content: &str) {
        write_file(&self.target_root().join(rel), content);
    }

    /// Delete a file from the source tree.
    pub fn remove_source(&self, rel: &str) {
        fs::remove_file(self.source_root().join(rel))
            .unwrap_or_else(|e| panic!("TestTree: cannot remove source {rel}: {e}"));
    }

    /// Read a target file as a string; follows symlinks.
    pub fn read_target(&self, rel: &str) -> String {
        fs::read_to_string(self.target_root().join(rel))
            .unwrap_or_else(|e| panic!("TestTree: cannot read target {rel}: {e}"))
    }

    /// Parse the persisted manifest as raw JSON.
    pub fn manifest_json(&self) -> serde_json::Value {
        let path = self.target_root().join(".kitsync-manifest.json");
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestTree: cannot read manifest: {e}"));
        serde_json::from_str(&content).expect("TestTree: manifest is not valid JSON")
    }

    /// Assert a path exists under the target root (symlinks count).
    pub fn assert_target_exists(&self, rel: &str) {
        assert!(
            fs::symlink_metadata(self.target_root().join(rel)).is_ok(),
            "expected target path to exist: {rel}"
        );
    }

    /// Assert a path is absent under the target root.
    pub fn assert_target_absent(&self, rel: &str) {
        assert!(
            fs::symlink_metadata(self.target_root().join(rel)).is_err(),
            "expected target path to be absent: {rel}"
        );
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
