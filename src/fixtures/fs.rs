//! fixtures::fs
//!
//! Filesystem fixture store.
//!
//! # Storage
//!
//! - `<root>/v<version>/<name>-<kind>.json` - Pretty-printed tree plus newline
//! - `<root>/.lock` - OS-level exclusive lock held for each write
//!
//! # Invariants
//!
//! - Writes go to a temp file in the target directory, then rename
//! - A reader never observes a half-written fixture
//! - The lock is released on drop (RAII pattern)

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde_json::Value;

use super::{FixtureKind, FixtureStore, StoreError};
use crate::core::paths::FixturePaths;
use crate::core::types::FixtureName;

/// An exclusive lock on a fixture root.
#[derive(Debug)]
pub struct FixtureLock {
    path: PathBuf,
    file: Option<File>,
}

impl FixtureLock {
    /// Acquire the lock, blocking until it is free.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Write` if the lock file cannot be created or locked.
    pub fn acquire(paths: &FixturePaths) -> Result<Self, StoreError> {
        let file = Self::open(paths)?;
        let path = paths.lock_path();
        file.lock_exclusive().map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Try to acquire the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if another holder has it.
    pub fn try_acquire(paths: &FixturePaths) -> Result<Self, StoreError> {
        let file = Self::open(paths)?;
        let path = paths.lock_path();
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(StoreError::Locked),
            Err(e) => Err(StoreError::Write { path, source: e }),
        }
    }

    fn open(paths: &FixturePaths) -> Result<File, StoreError> {
        fs::create_dir_all(paths.root()).map_err(|e| StoreError::Write {
            path: paths.root().to_path_buf(),
            source: e,
        })?;
        let path = paths.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::Write { path, source: e })
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FixtureLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

/// Fixture store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsFixtureStore {
    paths: FixturePaths,
}

impl FsFixtureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            paths: FixturePaths::new(root),
        }
    }

    pub fn paths(&self) -> &FixturePaths {
        &self.paths
    }
}

impl FixtureStore for FsFixtureStore {
    fn read(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
    ) -> Result<Option<Value>, StoreError> {
        let path = self.paths.fixture_path(version, name, kind);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Read { path, source: e }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                path,
                message: e.to_string(),
            })
    }

    fn write(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
        tree: &Value,
    ) -> Result<(), StoreError> {
        let _lock = FixtureLock::acquire(&self.paths)?;

        let dir = self
            .paths
            .ensure_version_dir(version)
            .map_err(|e| StoreError::Write {
                path: self.paths.version_dir(version),
                source: e,
            })?;
        let path = self.paths.fixture_path(version, name, kind);

        let mut contents =
            serde_json::to_string_pretty(tree).map_err(|e| StoreError::Other(e.to_string()))?;
        contents.push('\n');

        // The temp file is removed on drop unless persisted.
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.clone(),
            source,
        };
        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}-{}.", name.as_str(), kind.as_str()))
            .suffix(".json.tmp")
            .tempfile_in(&dir)
            .map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;

        file.persist(&path)
            .map(drop)
            .map_err(|e| write_err(e.error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn name() -> FixtureName {
        FixtureName::new("chain").unwrap()
    }

    #[test]
    fn missing_fixture_reads_none() {
        let temp = TempDir::new().unwrap();
        let store = FsFixtureStore::new(temp.path());
        assert!(store.read(9, &name(), FixtureKind::Json).unwrap().is_none());
    }

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let store = FsFixtureStore::new(temp.path());
        let tree = json!({"metadata": {"v14": {"pallets": []}}});

        store.write(14, &name(), FixtureKind::Types, &tree).unwrap();

        let path = temp.path().join("v14/chain-types.json");
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
        assert!(raw.contains("\n  \"metadata\""));
        assert_eq!(
            store.read(14, &name(), FixtureKind::Types).unwrap(),
            Some(tree)
        );
    }

    #[test]
    fn overwrite_replaces_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let store = FsFixtureStore::new(temp.path());
        store.write(9, &name(), FixtureKind::Json, &json!(1)).unwrap();
        store.write(9, &name(), FixtureKind::Json, &json!(2)).unwrap();

        assert_eq!(
            store.read(9, &name(), FixtureKind::Json).unwrap(),
            Some(json!(2))
        );
        let leftovers: Vec<_> = fs::read_dir(temp.path().join("v9"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn failed_rename_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let store = FsFixtureStore::new(temp.path());
        // A non-empty directory where the fixture belongs cannot be replaced.
        fs::create_dir_all(temp.path().join("v9/chain-json.json/inner")).unwrap();

        assert!(matches!(
            store.write(9, &name(), FixtureKind::Json, &json!(1)),
            Err(StoreError::Write { .. })
        ));
        let leftovers: Vec<_> = fs::read_dir(temp.path().join("v9"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_fixture_is_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("v9")).unwrap();
        fs::write(temp.path().join("v9/chain-json.json"), "{ nope").unwrap();

        let store = FsFixtureStore::new(temp.path());
        assert!(matches!(
            store.read(9, &name(), FixtureKind::Json),
            Err(StoreError::Parse { .. })
        ));
    }

    #[test]
    fn lock_prevents_second_try_acquire() {
        let temp = TempDir::new().unwrap();
        let paths = FixturePaths::new(temp.path());

        let lock = FixtureLock::acquire(&paths).unwrap();
        assert!(lock.is_held());
        assert!(lock.path().exists());
        assert!(matches!(
            FixtureLock::try_acquire(&paths),
            Err(StoreError::Locked)
        ));

        drop(lock);
        assert!(FixtureLock::try_acquire(&paths).is_ok());
    }
}
