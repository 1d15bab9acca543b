//! Source tree model
//!
//! The source of truth for a run: every payload file under the fixed
//! category directories, rebuilt from disk each time, never persisted.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kit_fs::{IgnoreSet, RelPath, collect_files};

use crate::error::Result;

/// Payload categories, each a top-level directory of the source tree and of
/// the target root. The list is fixed; components receive it through this
/// type rather than reading ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Commands,
    Agents,
    Skills,
}

impl Category {
    /// All categories, in install order.
    pub const ALL: [Category; 3] = [Category::Commands, Category::Agents, Category::Skills];

    /// Directory name under both the source root and the target root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Commands => "commands",
            Category::Agents => "agents",
            Category::Skills => "skills",
        }
    }

    /// Whether this category is delivered as one symlink per top-level
    /// group in link mode, rather than one symlink per file.
    pub fn grouped(&self) -> bool {
        matches!(self, Category::Skills)
    }

    /// Classify a relative path by its leading component.
    pub fn of_rel_path(rel: &str) -> Option<Category> {
        let first = rel.split('/').next()?;
        Category::ALL.iter().copied().find(|c| c.dir_name() == first)
    }
}

/// One file of the source tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Forward-slash relative path, the unique key ("skills/s/f.md").
    pub rel_path: RelPath,
    /// Absolute path in the source tree.
    pub abs_path: PathBuf,
    /// Category the file belongs to.
    pub category: Category,
}

/// The collected source file set for one run.
#[derive(Debug)]
pub struct SourceTree {
    root: PathBuf,
    files: Vec<SourceFile>,
    keys: BTreeSet<String>,
}

impl SourceTree {
    /// Enumerate every payload file under `root`'s category directories.
    ///
    /// Missing category directories contribute nothing; a source tree with
    /// only `skills/` is fine.
    pub fn collect(root: &Path, ignore: &IgnoreSet) -> Result<Self> {
        let mut files = Vec::new();
        for category in Category::ALL {
            let dir = root.join(category.dir_name());
            for found in collect_files(&dir, category.dir_name(), ignore)? {
                files.push(SourceFile {
                    rel_path: found.rel,
                    abs_path: found.abs,
                    category,
                });
            }
        }
        let keys = files.iter().map(|f| f.rel_path.as_str().to_string()).collect();
        Ok(Self {
            root: root.to_path_buf(),
            files,
            keys,
        })
    }

    /// Source tree root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files, sorted by relative path within each category.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Whether the source currently produces `rel_path`.
    pub fn contains(&self, rel_path: &str) -> bool {
        self.keys.contains(rel_path)
    }

    /// Top-level group names of the grouped category ("skills/<group>").
    pub fn skill_groups(&self) -> BTreeSet<String> {
        self.files
            .iter()
            .filter(|f| f.category.grouped())
            .filter_map(|f| f.rel_path.as_str().split('/').nth(1))
            .map(|g| g.to_string())
            .collect()
    }

    /// Absolute source directory for a skill group.
    pub fn skill_group_dir(&self, group: &str) -> PathBuf {
        self.root.join(Category::Skills.dir_name()).join(group)
    }
}
