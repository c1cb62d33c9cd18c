//! Collection schema declarations.
//!
//! A [`Schema`] is consulted only when the database is opened. It lists the
//! collections to create, their key policy and their secondary indexes.

use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;

/// Field holding every record's primary key.
pub const KEY_FIELD: &str = "id";

/// How a collection obtains keys for new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// Records without an `id` get the next integer key.
    #[default]
    AutoIncrement,
    /// Records must carry their own `id`.
    Supplied,
}

/// Specification for a secondary index on a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Name used for lookups.
    pub name: String,
    /// Record field the index projects.
    pub field: String,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexSpec {
    /// Creates a non-unique index spec.
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            unique: false,
        }
    }

    /// Creates a non-unique index named after its field.
    pub fn on(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(field.clone(), field)
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Declaration of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Collection name; also the engine store name.
    pub name: String,
    /// Key assignment policy.
    pub key_policy: KeyPolicy,
    /// Secondary indexes.
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSpec {
    /// Creates an auto-increment collection with no indexes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_policy: KeyPolicy::AutoIncrement,
            indexes: Vec::new(),
        }
    }

    /// Sets the key policy.
    #[must_use]
    pub fn key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }
}

/// A versioned set of collection declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Schema version; opening bumps the stored version up to this.
    pub version: u32,
    /// Declared collections.
    pub collections: Vec<CollectionSpec>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            collections: Vec::new(),
        }
    }

    /// Adds a collection.
    #[must_use]
    pub fn collection(mut self, spec: CollectionSpec) -> Self {
        self.collections.push(spec);
        self
    }

    /// Looks up a collection by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Checks the schema for duplicate names and a zero version.
    ///
    /// # Errors
    ///
    /// Returns an initialization error describing the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        if self.version == 0 {
            return Err(CoreError::initialization("schema version must be at least 1"));
        }
        let mut names = HashSet::new();
        for collection in &self.collections {
            if !names.insert(collection.name.as_str()) {
                return Err(CoreError::initialization(format!(
                    "duplicate collection: {}",
                    collection.name
                )));
            }
            let mut index_names = HashSet::new();
            for index in &collection.indexes {
                if !index_names.insert(index.name.as_str()) {
                    return Err(CoreError::initialization(format!(
                        "duplicate index {} on {}",
                        index.name, collection.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let schema = Schema::new(2).collection(
            CollectionSpec::new("students")
                .index(IndexSpec::on("email").unique())
                .index(IndexSpec::new("by_phone", "phone")),
        );
        let students = schema.get("students").unwrap();
        assert_eq!(students.key_policy, KeyPolicy::AutoIncrement);
        assert!(students.indexes[0].unique);
        assert_eq!(students.indexes[1].field, "phone");
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn duplicate_collection_rejected() {
        let schema = Schema::new(1)
            .collection(CollectionSpec::new("a"))
            .collection(CollectionSpec::new("a"));
        assert!(matches!(
            schema.validate(),
            Err(CoreError::Initialization { .. })
        ));
    }

    #[test]
    fn duplicate_index_rejected() {
        let schema = Schema::new(1).collection(
            CollectionSpec::new("a")
                .index(IndexSpec::on("x"))
                .index(IndexSpec::on("x")),
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn zero_version_rejected() {
        assert!(Schema::new(0).validate().is_err());
    }
}
