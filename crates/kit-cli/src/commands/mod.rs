//! Command implementations

mod status;
mod sync;

pub use status::run_status;
pub use sync::run_sync;

use std::path::PathBuf;

use crate::cli::ScopeArgs;
use crate::error::{CliError, Result};

/// Directory name of the install root under home or the project.
const TARGET_DIR_NAME: &str = ".claude";

/// Resolve the target root from the scope flags. `--user` is the default.
pub(crate) fn resolve_target_root(scope: &ScopeArgs) -> Result<PathBuf> {
    if scope.project {
        Ok(std::env::current_dir()?.join(TARGET_DIR_NAME))
    } else {
        dirs::home_dir()
            .map(|h| h.join(TARGET_DIR_NAME))
            .ok_or_else(|| CliError::user("cannot determine home directory"))
    }
}

/// Resolve the source tree root; defaults to the current directory.
pub(crate) fn resolve_source_root(scope: &ScopeArgs) -> Result<PathBuf> {
    match &scope.source {
        Some(path) => Ok(path.clone()),
        None => Ok(std::env::current_dir()?),
    }
}
