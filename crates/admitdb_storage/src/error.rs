//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The named store has not been created.
    #[error("store not found: {name}")]
    StoreNotFound {
        /// Name of the missing store.
        name: String,
    },

    /// The journal is corrupted beyond tail recovery.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the directory lock.
    #[error("storage locked: another process has exclusive access")]
    Locked,
}

impl StorageError {
    /// Creates a store-not-found error.
    pub fn store_not_found(name: impl Into<String>) -> Self {
        Self::StoreNotFound { name: name.into() }
    }
}
