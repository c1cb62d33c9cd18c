//! In-memory storage engine for testing.

use crate::engine::StorageEngine;
use crate::error::StorageResult;
use crate::state::EngineState;
use parking_lot::RwLock;

/// An in-memory storage engine.
///
/// This engine keeps every store in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Thread Safety
///
/// This engine is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use admitdb_storage::{MemoryEngine, StorageEngine};
///
/// let engine = MemoryEngine::new();
/// engine.create_store("streams").unwrap();
/// engine.put("streams", b"a", b"1").unwrap();
/// assert_eq!(engine.scan("streams").unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: RwLock<EngineState>,
}

impl MemoryEngine {
    /// Creates a new empty in-memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries across all stores.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.state.read().stores.values().map(|s| s.len()).sum()
    }
}

impl StorageEngine for MemoryEngine {
    fn version(&self) -> StorageResult<u32> {
        Ok(self.state.read().version)
    }

    fn set_version(&self, version: u32) -> StorageResult<()> {
        self.state.write().version = version;
        Ok(())
    }

    fn store_names(&self) -> StorageResult<Vec<String>> {
        Ok(self.state.read().stores.keys().cloned().collect())
    }

    fn create_store(&self, name: &str) -> StorageResult<()> {
        self.state.write().stores.entry(name.to_string()).or_default();
        Ok(())
    }

    fn get(&self, store: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.state.read().store(store)?.get(key).cloned())
    }

    fn put(&self, store: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.state
            .write()
            .store_mut(store)?
            .insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, store: &str, key: &[u8]) -> StorageResult<()> {
        self.state.write().store_mut(store)?.remove(key);
        Ok(())
    }

    fn scan(&self, store: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .state
            .read()
            .store(store)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    #[test]
    fn new_engine_is_empty() {
        let engine = MemoryEngine::new();
        assert_eq!(engine.version().unwrap(), 0);
        assert!(engine.store_names().unwrap().is_empty());
        assert_eq!(engine.total_entries(), 0);
    }

    #[test]
    fn put_get_delete() {
        let engine = MemoryEngine::new();
        engine.create_store("s").unwrap();
        engine.put("s", b"k", b"v1").unwrap();
        engine.put("s", b"k", b"v2").unwrap();
        assert_eq!(engine.get("s", b"k").unwrap(), Some(b"v2".to_vec()));

        engine.delete("s", b"k").unwrap();
        assert_eq!(engine.get("s", b"k").unwrap(), None);
        engine.delete("s", b"k").unwrap();
    }

    #[test]
    fn create_store_is_idempotent() {
        let engine = MemoryEngine::new();
        engine.create_store("s").unwrap();
        engine.put("s", b"k", b"v").unwrap();
        engine.create_store("s").unwrap();
        assert_eq!(engine.get("s", b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn scan_is_key_ordered() {
        let engine = MemoryEngine::new();
        engine.create_store("s").unwrap();
        engine.put("s", b"c", b"3").unwrap();
        engine.put("s", b"a", b"1").unwrap();
        engine.put("s", b"b", b"2").unwrap();

        let keys: Vec<_> = engine.scan("s").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn missing_store_fails() {
        let engine = MemoryEngine::new();
        assert!(matches!(
            engine.put("nope", b"k", b"v"),
            Err(StorageError::StoreNotFound { .. })
        ));
        assert!(matches!(
            engine.scan("nope"),
            Err(StorageError::StoreNotFound { .. })
        ));
    }

    #[test]
    fn store_names_sorted() {
        let engine = MemoryEngine::new();
        engine.create_store("zeta").unwrap();
        engine.create_store("alpha").unwrap();
        assert_eq!(engine.store_names().unwrap(), vec!["alpha", "zeta"]);
    }
}
