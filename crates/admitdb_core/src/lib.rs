//! # AdmitDB Core
//!
//! Collection layer for the AdmitDB embedded document store.
//!
//! This crate sits on top of a [`StorageEngine`] and provides:
//! - Named collections of JSON records keyed by [`RecordKey`]
//! - Auto-increment key assignment
//! - In-memory secondary hash indexes, optionally unique
//! - Additive, versioned schema setup on open
//! - A process-wide [`DatabaseStatus`] pushed to an optional listener
//!
//! Records are `serde_json::Value` objects. They are stored as CBOR inside
//! the engine.
//!
//! ## Example
//!
//! ```rust
//! use admitdb_core::{CollectionSpec, Database, IndexSpec, RecordKey, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new(1).collection(
//!     CollectionSpec::new("students").index(IndexSpec::on("email").unique()),
//! );
//!
//! let db = Database::in_memory();
//! db.open(&schema).unwrap();
//!
//! let key = db.add("students", json!({"email": "a@example.com"})).unwrap();
//! assert_eq!(key, RecordKey::Int(1));
//!
//! let found = db
//!     .get_all_by_index("students", "email", &json!("a@example.com"))
//!     .unwrap();
//! assert_eq!(found.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod index;
mod key;
mod record;
mod schema;
mod status;

pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use index::{IndexValue, SecondaryIndex};
pub use key::RecordKey;
pub use schema::{CollectionSpec, IndexSpec, KeyPolicy, Schema, KEY_FIELD};
pub use status::{DatabaseStatus, StatusListener};

pub use admitdb_storage::{FileEngine, MemoryEngine, StorageEngine, StorageError};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
