//! fixtures::memory
//!
//! In-memory fixture store for deterministic testing.
//!
//! Stores trees in a map and records every write, so tests can assert
//! whether a run reconciled a fixture or left the store untouched. Clones
//! share state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{FixtureKind, FixtureStore, StoreError};
use crate::core::types::FixtureName;

type Key = (u32, FixtureName, FixtureKind);

#[derive(Debug, Default)]
struct Inner {
    trees: BTreeMap<Key, Value>,
    writes: Vec<Key>,
    fail_writes: bool,
}

/// Thread-safe in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryFixtureStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFixtureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tree without recording a write.
    pub fn with_fixture(self, version: u32, name: &FixtureName, kind: FixtureKind, tree: Value) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.trees.insert((version, name.clone(), kind), tree);
        }
        self
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_writes = true;
        }
    }

    /// Keys written so far, in order.
    pub fn writes(&self) -> Vec<(u32, FixtureName, FixtureKind)> {
        self.inner
            .lock()
            .map(|inner| inner.writes.clone())
            .unwrap_or_default()
    }

    /// Stored tree for a key, bypassing the trait.
    pub fn get(&self, version: u32, name: &FixtureName, kind: FixtureKind) -> Option<Value> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.trees.get(&(version, name.clone(), kind)).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.trees.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FixtureStore for MemoryFixtureStore {
    fn read(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
    ) -> Result<Option<Value>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Other("store mutex poisoned".into()))?;
        Ok(inner.trees.get(&(version, name.clone(), kind)).cloned())
    }

    fn write(
        &self,
        version: u32,
        name: &FixtureName,
        kind: FixtureKind,
        tree: &Value,
    ) -> Result<(), StoreError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Other("store mutex poisoned".into()))?;
        if inner.fail_writes {
            return Err(StoreError::Other(format!(
                "write refused for v{version}/{name}-{kind}"
            )));
        }
        let key = (version, name.clone(), kind);
        inner.writes.push(key.clone());
        inner.trees.insert(key, tree.clone());
        Ok(())
    }
}
