//! core::paths
//!
//! Centralized path routing for golden fixture storage.
//!
//! # Storage Layout
//!
//! All fixtures live under one root directory:
//! - `v<version>/<name>-json.json` - Structural tree, lookup stripped
//! - `v<version>/<name>-types.json` - Type lookup tree (v14+)
//! - `.lock` - Exclusive lock file held while writing
//!
//! **Hard rule:** No code outside this module joins fixture file names.
//!
//! # Example
//!
//! ```
//! use metaconform::core::paths::FixturePaths;
//! use metaconform::core::types::FixtureName;
//! use metaconform::fixtures::FixtureKind;
//! use std::path::PathBuf;
//!
//! let paths = FixturePaths::new("/repo/fixtures");
//! let name = FixtureName::new("relevant-chain").unwrap();
//!
//! assert_eq!(
//!     paths.fixture_path(9, &name, FixtureKind::Json),
//!     PathBuf::from("/repo/fixtures/v9/relevant-chain-json.json")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::FixtureName;
use crate::fixtures::FixtureKind;

/// Path routing for one fixture root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePaths {
    root: PathBuf,
}

impl FixturePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one schema version: `<root>/v<version>`.
    pub fn version_dir(&self, version: u32) -> PathBuf {
        self.root.join(format!("v{version}"))
    }

    /// `<root>/v<version>/<name>-<kind>.json`.
    pub fn fixture_path(&self, version: u32, name: &FixtureName, kind: FixtureKind) -> PathBuf {
        self.version_dir(version)
            .join(format!("{}-{}.json", name.as_str(), kind.as_str()))
    }

    /// `<root>/.lock`.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// Ensure the version directory exists.
    ///
    /// # Errors
    ///
    /// Returns an IO error if directory creation fails.
    pub fn ensure_version_dir(&self, version: u32) -> std::io::Result<PathBuf> {
        let dir = self.version_dir(version);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
