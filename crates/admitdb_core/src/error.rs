//! Error types for AdmitDB core.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in AdmitDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The database has not been opened, or has been closed.
    #[error("database is not initialized")]
    NotInitialized,

    /// Opening the database failed.
    #[error("initialization failed: {message}")]
    Initialization {
        /// Description of the failure.
        message: String,
    },

    /// A key or unique index already holds the value.
    #[error("constraint violation in {collection}: {message}")]
    ConstraintViolation {
        /// Collection the write targeted.
        collection: String,
        /// Description of the violated constraint.
        message: String,
    },

    /// A record required by the operation does not exist.
    #[error("record not found: {key} in {collection}")]
    NotFound {
        /// Collection searched.
        collection: String,
        /// Key that was not found.
        key: String,
    },

    /// Storage engine error.
    #[error("engine error: {0}")]
    Engine(#[from] admitdb_storage::StorageError),

    /// A record or snapshot could not be encoded or decoded.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// The collection is not part of the open schema.
    #[error("unknown collection: {name}")]
    UnknownCollection {
        /// Name of the collection.
        name: String,
    },

    /// The collection has no index with this name.
    #[error("unknown index {index} on {collection}")]
    UnknownIndex {
        /// Name of the collection.
        collection: String,
        /// Name of the index.
        index: String,
    },
}

impl CoreError {
    /// Creates an initialization error.
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    /// Creates a constraint violation error.
    pub fn constraint(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(collection: impl Into<String>, key: impl fmt::Display) -> Self {
        Self::NotFound {
            collection: collection.into(),
            key: key.to_string(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Creates an unknown-collection error.
    pub fn unknown_collection(name: impl Into<String>) -> Self {
        Self::UnknownCollection { name: name.into() }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized => ErrorKind::NotInitialized,
            Self::Initialization { .. } => ErrorKind::Initialization,
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Engine(_) => ErrorKind::Engine,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::UnknownCollection { .. } => ErrorKind::UnknownCollection,
            Self::UnknownIndex { .. } => ErrorKind::UnknownIndex,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Serializable error category, carried in failure outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`CoreError::NotInitialized`].
    NotInitialized,
    /// See [`CoreError::Initialization`].
    #[serde(rename = "initialization_error")]
    Initialization,
    /// See [`CoreError::ConstraintViolation`].
    ConstraintViolation,
    /// See [`CoreError::NotFound`].
    NotFound,
    /// See [`CoreError::Engine`].
    #[serde(rename = "engine_error")]
    Engine,
    /// See [`CoreError::Serialization`].
    #[serde(rename = "serialization_error")]
    Serialization,
    /// See [`CoreError::UnknownCollection`].
    UnknownCollection,
    /// See [`CoreError::UnknownIndex`].
    UnknownIndex,
}

impl ErrorKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Initialization => "initialization_error",
            Self::ConstraintViolation => "constraint_violation",
            Self::NotFound => "not_found",
            Self::Engine => "engine_error",
            Self::Serialization => "serialization_error",
            Self::UnknownCollection => "unknown_collection",
            Self::UnknownIndex => "unknown_index",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
