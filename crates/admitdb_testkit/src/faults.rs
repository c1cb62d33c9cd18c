//! Fault injection.

use admitdb_storage::{MemoryEngine, StorageEngine, StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::io;

/// An in-memory engine whose writes to selected stores fail.
///
/// Reads always succeed. Useful for checking that a failed side write does
/// not undo or fail the primary write.
#[derive(Debug, Default)]
pub struct FaultyEngine {
    inner: MemoryEngine,
    failing: RwLock<HashSet<String>>,
}

impl FaultyEngine {
    /// Creates an engine with no faults armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every put and delete on `store` fail with an I/O error.
    pub fn fail_writes_to(&self, store: &str) {
        self.failing.write().insert(store.to_string());
    }

    /// Disarms the fault on `store`.
    pub fn heal(&self, store: &str) {
        self.failing.write().remove(store);
    }

    fn check(&self, store: &str) -> StorageResult<()> {
        if self.failing.read().contains(store) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("injected write fault on {store}"),
            )));
        }
        Ok(())
    }
}

impl StorageEngine for FaultyEngine {
    fn version(&self) -> StorageResult<u32> {
        self.inner.version()
    }

    fn set_version(&self, version: u32) -> StorageResult<()> {
        self.inner.set_version(version)
    }

    fn store_names(&self) -> StorageResult<Vec<String>> {
        self.inner.store_names()
    }

    fn create_store(&self, name: &str) -> StorageResult<()> {
        self.inner.create_store(name)
    }

    fn get(&self, store: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.inner.get(store, key)
    }

    fn put(&self, store: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.check(store)?;
        self.inner.put(store, key, value)
    }

    fn delete(&self, store: &str, key: &[u8]) -> StorageResult<()> {
        self.check(store)?;
        self.inner.delete(store, key)
    }

    fn scan(&self, store: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.scan(store)
    }

    fn flush(&self) -> StorageResult<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armed_store_fails_others_pass() {
        let engine = FaultyEngine::new();
        engine.create_store("a").unwrap();
        engine.create_store("b").unwrap();
        engine.fail_writes_to("a");

        assert!(matches!(engine.put("a", b"k", b"v"), Err(StorageError::Io(_))));
        engine.put("b", b"k", b"v").unwrap();

        engine.heal("a");
        engine.put("a", b"k", b"v").unwrap();
        assert_eq!(engine.get("a", b"k").unwrap(), Some(b"v".to_vec()));
    }
}
