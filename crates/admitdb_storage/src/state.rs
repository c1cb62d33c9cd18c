//! In-memory engine state shared by every engine implementation.

use crate::error::{StorageError, StorageResult};
use crate::journal::JournalEntry;
use std::collections::BTreeMap;

/// Ordered key-value map backing one store.
pub(crate) type StoreMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Live contents of an engine.
#[derive(Debug, Default, Clone)]
pub(crate) struct EngineState {
    pub(crate) version: u32,
    pub(crate) stores: BTreeMap<String, StoreMap>,
}

impl EngineState {
    pub(crate) fn store(&self, name: &str) -> StorageResult<&StoreMap> {
        self.stores
            .get(name)
            .ok_or_else(|| StorageError::store_not_found(name))
    }

    pub(crate) fn store_mut(&mut self, name: &str) -> StorageResult<&mut StoreMap> {
        self.stores
            .get_mut(name)
            .ok_or_else(|| StorageError::store_not_found(name))
    }

    pub(crate) fn has_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Applies a journal entry. Used both for live writes and replay.
    pub(crate) fn apply(&mut self, entry: &JournalEntry) -> StorageResult<()> {
        match entry {
            JournalEntry::Version(version) => {
                self.version = *version;
            }
            JournalEntry::CreateStore { name } => {
                self.stores.entry(name.clone()).or_default();
            }
            JournalEntry::Put { store, key, value } => {
                self.store_mut(store)?.insert(key.clone(), value.clone());
            }
            JournalEntry::Delete { store, key } => {
                self.store_mut(store)?.remove(key);
            }
        }
        Ok(())
    }

    /// Produces the minimal entry sequence that recreates this state.
    pub(crate) fn to_entries(&self) -> Vec<JournalEntry> {
        let mut entries = vec![JournalEntry::Version(self.version)];
        for (name, map) in &self.stores {
            entries.push(JournalEntry::CreateStore { name: name.clone() });
            for (key, value) in map {
                entries.push(JournalEntry::Put {
                    store: name.clone(),
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        entries
    }
}
