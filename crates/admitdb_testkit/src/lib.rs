//! # AdmitDB Testkit
//!
//! Test utilities for AdmitDB.
//!
//! This crate provides:
//! - Test fixtures: in-memory and temp-dir databases
//! - A fault-injecting engine for failure-path tests
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use admitdb_core::{CollectionSpec, Schema};
//! use admitdb_testkit::prelude::*;
//! use serde_json::json;
//!
//! let db = TestDatabase::memory();
//! db.open(&Schema::new(1).collection(CollectionSpec::new("notes"))).unwrap();
//! db.add("notes", json!({"text": "hi"})).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
