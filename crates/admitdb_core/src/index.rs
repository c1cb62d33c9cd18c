//! Secondary hash indexes.

use crate::error::{CoreError, CoreResult};
use crate::key::RecordKey;
use crate::schema::IndexSpec;
use serde_json::{Number, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Canonical form of an indexed field value.
///
/// Only strings, numbers and booleans are indexable. Strings and booleans
/// are keyed by their compact JSON text, so `"1"` and `1` are distinct
/// values. Numbers are keyed by numeric value, so `1`, `1.0` and `-0.0`
/// (as `0`) compare as they do in the browser store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexValue(String);

impl IndexValue {
    /// Canonicalizes a field value, or returns `None` if it is not indexable.
    #[must_use]
    pub fn from_field(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Bool(_) => Some(Self(value.to_string())),
            Value::Number(n) => Some(Self(canonical_number(n))),
            _ => None,
        }
    }

    /// Extracts and canonicalizes `field` from a record.
    #[must_use]
    pub fn from_record(record: &Value, field: &str) -> Option<Self> {
        record.get(field).and_then(Self::from_field)
    }
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    // Integral floats display without a fraction; adding zero folds -0.0.
    n.as_f64()
        .map_or_else(|| n.to_string(), |f| (f + 0.0).to_string())
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash-based secondary index for equality lookups.
///
/// Maps each indexed value to the set of record keys holding it.
#[derive(Debug, Clone)]
pub struct SecondaryIndex {
    spec: IndexSpec,
    entries: HashMap<IndexValue, HashSet<RecordKey>>,
    count: usize,
}

impl SecondaryIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(spec: IndexSpec) -> Self {
        Self {
            spec,
            entries: HashMap::new(),
            count: 0,
        }
    }

    /// Returns the index specification.
    #[must_use]
    pub fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// Checks that writing `record` under `key` keeps a unique index unique.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConstraintViolation`] if another key already
    /// holds the record's value.
    pub fn check(&self, collection: &str, key: &RecordKey, record: &Value) -> CoreResult<()> {
        if !self.spec.unique {
            return Ok(());
        }
        let Some(value) = IndexValue::from_record(record, &self.spec.field) else {
            return Ok(());
        };
        match self.entries.get(&value) {
            Some(holders) if holders.iter().any(|k| k != key) => Err(CoreError::constraint(
                collection,
                format!("unique index {} already contains {value}", self.spec.name),
            )),
            _ => Ok(()),
        }
    }

    /// Adds `record`'s value under `key`. Does not check uniqueness.
    pub fn insert(&mut self, key: &RecordKey, record: &Value) {
        if let Some(value) = IndexValue::from_record(record, &self.spec.field) {
            if self.entries.entry(value).or_default().insert(key.clone()) {
                self.count += 1;
            }
        }
    }

    /// Removes `record`'s value for `key`.
    pub fn remove(&mut self, key: &RecordKey, record: &Value) {
        let Some(value) = IndexValue::from_record(record, &self.spec.field) else {
            return;
        };
        if let Some(set) = self.entries.get_mut(&value) {
            if set.remove(key) {
                self.count -= 1;
                if set.is_empty() {
                    self.entries.remove(&value);
                }
            }
        }
    }

    /// Returns the keys holding `value`, in key order.
    #[must_use]
    pub fn lookup(&self, value: &IndexValue) -> Vec<RecordKey> {
        let mut keys: Vec<_> = self
            .entries
            .get(value)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Returns the number of indexed (value, key) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
