//! Storage engine trait definition.

use crate::error::StorageResult;

/// A key-value storage engine for AdmitDB.
///
/// An engine is a set of **named stores**. Each store maps byte keys to
/// byte values and keeps them in key order. The engine also persists a
/// single schema version number that AdmitDB core uses to decide whether
/// additive schema setup is needed.
///
/// # Invariants
///
/// - Each method is atomic: it either fully applies or leaves no trace
/// - `create_store` is idempotent and stores are never removed
/// - `delete` of an absent key succeeds
/// - `scan` returns entries in ascending key order
/// - Operating on a store that was never created fails with
///   [`StorageError::StoreNotFound`](crate::StorageError::StoreNotFound)
///
/// # Implementors
///
/// - [`super::MemoryEngine`] - For testing
/// - [`super::FileEngine`] - For persistent storage
pub trait StorageEngine: Send + Sync {
    /// Returns the persisted schema version (0 for a fresh engine).
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    fn version(&self) -> StorageResult<u32>;

    /// Persists a new schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be written.
    fn set_version(&self, version: u32) -> StorageResult<()>;

    /// Returns the names of all stores, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store registry cannot be read.
    fn store_names(&self) -> StorageResult<Vec<String>>;

    /// Creates a store if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created.
    fn create_store(&self, name: &str) -> StorageResult<()>;

    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist or the read fails.
    fn get(&self, store: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Inserts or replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist or the write fails.
    fn put(&self, store: &str, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Removes `key` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist or the write fails.
    fn delete(&self, store: &str, key: &[u8]) -> StorageResult<()>;

    /// Returns every entry of a store in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist or the read fails.
    fn scan(&self, store: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Flushes pending writes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&self) -> StorageResult<()>;
}
