//! Database facade: collections, keys and secondary indexes.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::index::{IndexValue, SecondaryIndex};
use crate::key::RecordKey;
use crate::record::{decode_record, encode_record};
use crate::schema::{CollectionSpec, KeyPolicy, Schema, KEY_FIELD};
use crate::status::{DatabaseStatus, StatusCell, StatusListener};
use admitdb_storage::{FileEngine, MemoryEngine, StorageEngine};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// The main database handle.
///
/// `Database` maps named collections onto engine stores. It provides:
/// - Additive schema setup with a persisted version
/// - Single-record add / get / update / delete, each atomic on its own
/// - Equality lookups through in-memory secondary indexes
/// - A status value pushed to an optional [`StatusListener`]
///
/// A handle starts uninitialized. Every record operation fails with
/// [`CoreError::NotInitialized`] until [`Database::open`] succeeds.
///
/// # Example
///
/// ```rust
/// use admitdb_core::{CollectionSpec, Database, Schema};
/// use serde_json::json;
///
/// let db = Database::in_memory();
/// db.open(&Schema::new(1).collection(CollectionSpec::new("streams"))).unwrap();
///
/// let id = db.add("streams", json!({"name": "Science"})).unwrap();
/// let stream = db.get("streams", &id).unwrap().unwrap();
/// assert_eq!(stream["name"], "Science");
/// ```
pub struct Database {
    engine: Arc<dyn StorageEngine>,
    config: Config,
    state: RwLock<Option<OpenState>>,
    status: StatusCell,
}

/// Per-collection state built on open.
struct Collection {
    spec: CollectionSpec,
    indexes: HashMap<String, SecondaryIndex>,
    next_key: i64,
}

struct OpenState {
    version: u32,
    collections: BTreeMap<String, Collection>,
}

impl OpenState {
    fn collection(&self, name: &str) -> CoreResult<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| CoreError::unknown_collection(name))
    }

    fn collection_mut(&mut self, name: &str) -> CoreResult<&mut Collection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| CoreError::unknown_collection(name))
    }
}

impl Collection {
    fn new(spec: CollectionSpec) -> Self {
        let indexes = spec
            .indexes
            .iter()
            .map(|i| (i.name.clone(), SecondaryIndex::new(i.clone())))
            .collect();
        Self {
            spec,
            indexes,
            next_key: 1,
        }
    }

    /// Validates a record and returns its key, assigning one if needed.
    fn resolve_key(&self, record: &mut Value) -> CoreResult<RecordKey> {
        let Value::Object(map) = record else {
            return Err(CoreError::serialization(format!(
                "record for {} must be a JSON object",
                self.spec.name
            )));
        };
        match map.get(KEY_FIELD) {
            Some(id) if !id.is_null() => RecordKey::from_value(id),
            _ => match self.spec.key_policy {
                KeyPolicy::AutoIncrement => {
                    let key = RecordKey::Int(self.next_key);
                    map.insert(KEY_FIELD.to_string(), key.to_value());
                    Ok(key)
                }
                KeyPolicy::Supplied => Err(CoreError::serialization(format!(
                    "record for {} has no {KEY_FIELD}",
                    self.spec.name
                ))),
            },
        }
    }

    fn observe_key(&mut self, key: &RecordKey) {
        if let Some(i) = key.as_int() {
            self.next_key = self.next_key.max(i.saturating_add(1));
        }
    }

    fn check_unique(&self, key: &RecordKey, record: &Value) -> CoreResult<()> {
        for index in self.indexes.values() {
            index.check(&self.spec.name, key, record)?;
        }
        Ok(())
    }

    fn index_insert(&mut self, key: &RecordKey, record: &Value) {
        for index in self.indexes.values_mut() {
            index.insert(key, record);
        }
    }

    fn index_remove(&mut self, key: &RecordKey, record: &Value) {
        for index in self.indexes.values_mut() {
            index.remove(key, record);
        }
    }
}

impl Database {
    /// Creates an uninitialized handle over an engine.
    pub fn new(engine: Arc<dyn StorageEngine>, config: Config) -> Self {
        Self {
            engine,
            config,
            state: RwLock::new(None),
            status: StatusCell::default(),
        }
    }

    /// Creates an uninitialized handle over a fresh [`MemoryEngine`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEngine::new()), Config::default())
    }

    /// Creates an uninitialized handle over a [`FileEngine`] at `path`.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the directory cannot be opened or locked.
    pub fn at_path(path: &Path, config: Config) -> CoreResult<Self> {
        let engine = FileEngine::open(path, config.file_engine_config())?;
        Ok(Self::new(Arc::new(engine), config))
    }

    /// Returns the underlying engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the database against `schema`.
    ///
    /// Missing collections are created; existing ones are never dropped or
    /// renamed. A stored version lower than the schema version is bumped.
    /// Indexes are rebuilt from a full scan of every collection.
    ///
    /// Opening an already open handle re-runs the setup.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Initialization`] if the schema is invalid, the
    /// stored version is newer than the schema (downgrade), existing data
    /// violates a unique index, or the engine fails. The status becomes
    /// [`DatabaseStatus::Error`] and the handle stays uninitialized.
    pub fn open(&self, schema: &Schema) -> CoreResult<()> {
        let mut state = self.state.write();
        match self.build(schema) {
            Ok(open) => {
                tracing::info!(
                    version = open.version,
                    collections = open.collections.len(),
                    "database opened"
                );
                *state = Some(open);
                drop(state);
                self.status.set(DatabaseStatus::Connected);
                Ok(())
            }
            Err(err) => {
                *state = None;
                drop(state);
                tracing::error!(error = %err, "database open failed");
                self.status.set(DatabaseStatus::Error);
                Err(match err {
                    init @ CoreError::Initialization { .. } => init,
                    other => CoreError::initialization(other.to_string()),
                })
            }
        }
    }

    fn build(&self, schema: &Schema) -> CoreResult<OpenState> {
        schema.validate()?;

        let stored = self.engine.version()?;
        if stored > schema.version {
            return Err(CoreError::initialization(format!(
                "stored schema version {stored} is newer than {}",
                schema.version
            )));
        }

        let existing = self.engine.store_names()?;
        for spec in &schema.collections {
            if !existing.contains(&spec.name) {
                self.engine.create_store(&spec.name)?;
                tracing::debug!(collection = %spec.name, "created collection");
            }
        }
        if stored < schema.version {
            self.engine.set_version(schema.version)?;
            tracing::info!(from = stored, to = schema.version, "upgraded schema");
        }

        let mut collections = BTreeMap::new();
        for spec in &schema.collections {
            let mut collection = Collection::new(spec.clone());
            for (raw_key, raw_value) in self.engine.scan(&spec.name)? {
                let key = RecordKey::decode(&raw_key)?;
                let record = decode_record(&raw_value)?;
                collection.check_unique(&key, &record)?;
                collection.index_insert(&key, &record);
                collection.observe_key(&key);
            }
            collections.insert(spec.name.clone(), collection);
        }

        Ok(OpenState {
            version: schema.version,
            collections,
        })
    }

    /// Closes the handle. Later operations fail with `NotInitialized`.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the final flush fails.
    pub fn close(&self) -> CoreResult<()> {
        let was_open = self.state.write().take().is_some();
        if was_open {
            if self.config.flush_on_close {
                self.engine.flush()?;
            }
            self.status.set(DatabaseStatus::NotInitialized);
            tracing::info!("database closed");
        }
        Ok(())
    }

    /// Returns true if the database has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> DatabaseStatus {
        self.status.get()
    }

    /// Sets the status and notifies the listener.
    pub fn set_status(&self, status: DatabaseStatus) {
        self.status.set(status);
    }

    /// Installs or removes the status listener.
    pub fn set_status_listener(&self, listener: Option<Arc<dyn StatusListener>>) {
        self.status.set_listener(listener);
    }

    /// Returns the schema version the database was opened with.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the database is not open.
    pub fn schema_version(&self) -> CoreResult<u32> {
        self.with_state(|state| Ok(state.version))
    }

    /// Returns the names of the open collections, sorted.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the database is not open.
    pub fn collection_names(&self) -> CoreResult<Vec<String>> {
        self.with_state(|state| Ok(state.collections.keys().cloned().collect()))
    }

    /// Returns the index names of a collection.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` or `UnknownCollection`.
    pub fn index_names(&self, collection: &str) -> CoreResult<Vec<String>> {
        self.with_state(|state| {
            Ok(state
                .collection(collection)?
                .spec
                .indexes
                .iter()
                .map(|i| i.name.clone())
                .collect())
        })
    }

    /// Inserts a new record and returns its key.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` if the key exists or a unique index rejects it
    /// - `Serialization` if the record is not an object or its `id` is invalid
    /// - `Engine` on engine failure
    pub fn add(&self, collection: &str, mut record: Value) -> CoreResult<RecordKey> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::NotInitialized)?;
        let coll = state.collection_mut(collection)?;

        let key = coll.resolve_key(&mut record)?;
        let raw_key = key.encode();
        if self.engine.get(collection, &raw_key)?.is_some() {
            return Err(CoreError::constraint(
                collection,
                format!("key {key} already exists"),
            ));
        }
        coll.check_unique(&key, &record)?;

        self.engine.put(collection, &raw_key, &encode_record(&record)?)?;
        coll.index_insert(&key, &record);
        coll.observe_key(&key);

        tracing::debug!(collection, %key, "added record");
        Ok(key)
    }

    /// Inserts or replaces a record by key and returns the key.
    ///
    /// The whole record is replaced. Records without an `id` are inserted
    /// with a new key, as with [`Database::add`].
    ///
    /// # Errors
    ///
    /// Same as [`Database::add`], except an existing key is not an error.
    pub fn update(&self, collection: &str, mut record: Value) -> CoreResult<RecordKey> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::NotInitialized)?;
        let coll = state.collection_mut(collection)?;

        let key = coll.resolve_key(&mut record)?;
        let raw_key = key.encode();
        coll.check_unique(&key, &record)?;
        let previous = self
            .engine
            .get(collection, &raw_key)?
            .map(|bytes| decode_record(&bytes))
            .transpose()?;

        self.engine.put(collection, &raw_key, &encode_record(&record)?)?;
        if let Some(previous) = previous {
            coll.index_remove(&key, &previous);
        }
        coll.index_insert(&key, &record);
        coll.observe_key(&key);

        tracing::debug!(collection, %key, "updated record");
        Ok(key)
    }

    /// Reads a record by key. An absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `UnknownCollection`, or an engine or
    /// decoding error.
    pub fn get(&self, collection: &str, key: &RecordKey) -> CoreResult<Option<Value>> {
        self.with_state(|state| {
            state.collection(collection)?;
            self.engine
                .get(collection, &key.encode())?
                .map(|bytes| decode_record(&bytes))
                .transpose()
        })
    }

    /// Returns every record of a collection in key order.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `UnknownCollection`, or an engine or
    /// decoding error.
    pub fn get_all(&self, collection: &str) -> CoreResult<Vec<Value>> {
        self.with_state(|state| {
            state.collection(collection)?;
            self.engine
                .scan(collection)?
                .iter()
                .map(|(_, bytes)| decode_record(bytes))
                .collect()
        })
    }

    /// Returns every record whose indexed field equals `value`.
    ///
    /// Values that cannot be indexed (null, arrays, objects) match nothing.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `UnknownCollection`, `UnknownIndex`, or an
    /// engine or decoding error.
    pub fn get_all_by_index(
        &self,
        collection: &str,
        index: &str,
        value: &Value,
    ) -> CoreResult<Vec<Value>> {
        self.with_state(|state| {
            let coll = state.collection(collection)?;
            let idx = coll
                .indexes
                .get(index)
                .ok_or_else(|| CoreError::UnknownIndex {
                    collection: collection.to_string(),
                    index: index.to_string(),
                })?;
            let Some(value) = IndexValue::from_field(value) else {
                return Ok(Vec::new());
            };

            let mut records = Vec::new();
            for key in idx.lookup(&value) {
                if let Some(bytes) = self.engine.get(collection, &key.encode())? {
                    records.push(decode_record(&bytes)?);
                }
            }
            Ok(records)
        })
    }

    /// Removes a record and its index entries. An absent key is fine.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `UnknownCollection`, or an engine error.
    pub fn delete(&self, collection: &str, key: &RecordKey) -> CoreResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(CoreError::NotInitialized)?;
        let coll = state.collection_mut(collection)?;

        let raw_key = key.encode();
        let Some(bytes) = self.engine.get(collection, &raw_key)? else {
            return Ok(());
        };
        let previous = decode_record(&bytes)?;
        self.engine.delete(collection, &raw_key)?;
        coll.index_remove(key, &previous);

        tracing::debug!(collection, %key, "deleted record");
        Ok(())
    }

    /// Returns the number of records in a collection.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, `UnknownCollection`, or an engine error.
    pub fn count(&self, collection: &str) -> CoreResult<usize> {
        self.with_state(|state| {
            state.collection(collection)?;
            Ok(self.engine.scan(collection)?.len())
        })
    }

    /// Flushes the engine.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` or an engine error.
    pub fn flush(&self) -> CoreResult<()> {
        self.with_state(|_| Ok(self.engine.flush()?))
    }

    fn with_state<T>(&self, f: impl FnOnce(&OpenState) -> CoreResult<T>) -> CoreResult<T> {
        let guard = self.state.read();
        let state = guard.as_ref().ok_or(CoreError::NotInitialized)?;
        f(state)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("open", &self.is_open())
            .field("status", &self.status.get())
            .field("config", &self.config)
            .finish()
    }
}
