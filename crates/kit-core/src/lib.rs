//! Core sync engine for kitsync
//!
//! Reconciles a source asset tree (`commands/`, `agents/`, `skills/`)
//! with a previously recorded installation state under a target root.
//!
//! The run is a linear phase sequence, each phase consuming only the prior
//! phase's output:
//!
//! ```text
//! manifest load -> (absent) legacy migration -> collect -> diff
//!     -> conflict resolution -> install -> orphan removal -> manifest write
//! ```
//!
//! [`engine::SyncEngine`] drives the sequence; the individual phases live in
//! their own modules and are independently testable.

pub mod diff;
pub mod engine;
pub mod error;
pub mod install;
pub mod manifest;
pub mod migrate;
pub mod orphans;
pub mod resolve;
pub mod source;

pub use diff::{DiffReport, FileState, classify};
pub use engine::{SyncEngine, SyncOptions, SyncReport};
pub use error::{Error, Result};
pub use manifest::{FileDigest, MANIFEST_FILENAME, Manifest, Mode};
pub use resolve::{ConflictPrompt, Decision, resolve_conflicts};
pub use source::{Category, SourceFile, SourceTree};
