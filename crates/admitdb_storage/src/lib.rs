//! # AdmitDB Storage
//!
//! Key-value storage engines for AdmitDB.
//!
//! This crate provides the lowest-level storage abstraction for AdmitDB.
//! An engine holds **named stores** of ordered byte keys mapped to opaque
//! byte values, plus a single persisted schema version. Engines do not
//! interpret keys or values.
//!
//! ## Design Principles
//!
//! - Every call is atomic on its own; there are no multi-call transactions
//! - Stores are created additively and never dropped
//! - Must be `Send + Sync` so a single handle can be shared
//! - AdmitDB core owns record encoding and secondary indexes
//!
//! ## Available Engines
//!
//! - [`MemoryEngine`] - For testing and ephemeral databases
//! - [`FileEngine`] - Append-only journal in a locked directory
//!
//! ## Example
//!
//! ```rust
//! use admitdb_storage::{MemoryEngine, StorageEngine};
//!
//! let engine = MemoryEngine::new();
//! engine.create_store("students").unwrap();
//! engine.put("students", b"k1", b"hello").unwrap();
//! assert_eq!(engine.get("students", b"k1").unwrap(), Some(b"hello".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod error;
mod file;
mod journal;
mod memory;
mod state;

pub use engine::StorageEngine;
pub use error::{StorageError, StorageResult};
pub use file::{FileEngine, FileEngineConfig};
pub use memory::MemoryEngine;
