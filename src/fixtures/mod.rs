//! fixtures
//!
//! Golden fixture persistence and suite manifests.
//!
//! # Architecture
//!
//! The harness reads and writes golden trees only through the
//! [`FixtureStore`] trait, keyed by `(version, name, kind)`. Two
//! implementations ship with the crate:
//!
//! - [`fs::FsFixtureStore`]: one pretty-printed JSON file per key under a
//!   fixture root, written under an exclusive lock via temp file + rename
//! - [`memory::MemoryFixtureStore`]: in-memory store for deterministic tests
//!
//! [`manifest`] describes which fixtures a suite runs.
//!
//! # Example
//!
//! ```
//! use metaconform::core::types::FixtureName;
//! use metaconform::fixtures::{FixtureKind, FixtureStore, MemoryFixtureStore};
//! use serde_json::json;
//!
//! let store = MemoryFixtureStore::new();
//! let name = FixtureName::new("chain").unwrap();
//!
//! assert!(store.read(9, &name, FixtureKind::Json).unwrap().is_none());
//! store.write(9, &name, FixtureKind::Json, &json!({"a": 1})).unwrap();
//! assert_eq!(store.read(9, &name, FixtureKind::Json).unwrap(), Some(json!({"a": 1})));
//! ```

pub mod fs;
pub mod manifest;
pub mod memory;

pub use fs::{FixtureLock, FsFixtureStore};
pub use manifest::{FixtureSpec, Manifest, ManifestError};
pub use memory::MemoryFixtureStore;

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::core::types::FixtureName;

/// Kind of golden tree stored for a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FixtureKind {
    /// Structural tree with the type lookup removed.
    Json,
    /// Type lookup tree alone (v14+).
    Types,
}

impl FixtureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FixtureKind::Json => "json",
            FixtureKind::Types => "types",
        }
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from fixture store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("fixture store is locked by another process")]
    Locked,

    #[error("failed to read fixture '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write fixture '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("fixture '{path}' is not valid json: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("fixture store error: {0}")]
    Other(String),
}

/// Key-value persistence for golden trees.
pub trait FixtureStore {
    /// Read a stored tree. `Ok(None)` when no fixture exists for the key.
    fn read(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
    ) -> Result<Option<Value>, StoreError>;

    /// Write (or overwrite) the tree for a key.
    fn write(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
        tree: &Value,
    ) -> Result<(), StoreError>;
}

impl<S: FixtureStore + ?Sized> FixtureStore for &S {
    fn read(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
    ) -> Result<Option<Value>, StoreError> {
        (**self).read(version, name, kind)
    }

    fn write(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
        tree: &Value,
    ) -> Result<(), StoreError> {
        (**self).write(version, name, kind, tree)
    }
}
