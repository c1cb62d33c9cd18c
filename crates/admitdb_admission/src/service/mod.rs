//! The admission store context and its domain operations.
//!
//! Operations are grouped by entity in the submodules; each adds an
//! `impl AdmissionDb` block.

mod analytics;
mod applications;
mod documents;
mod notifications;
mod search;
mod snapshot;
mod streams;
mod students;

pub use analytics::DateRange;
pub use snapshot::{Backup, Snapshot};

use crate::config::AdmissionConfig;
use crate::records::Record;
use crate::schema::admission_schema;
use admitdb_core::{CoreError, CoreResult, Database, DatabaseStatus, RecordKey, StatusListener};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

/// Receives unread-count changes, e.g. to refresh a notification badge.
pub trait NotificationListener: Send + Sync {
    /// Called after a student's notifications change.
    fn unread_changed(&self, student_id: &RecordKey, unread: usize);
}

/// Explicit context for the admission store.
///
/// Holds the shared [`Database`] handle, the admission configuration and
/// an optional [`NotificationListener`]. Created uninitialized; call
/// [`AdmissionDb::open`] before any operation.
///
/// Multi-step operations (for example creating an application and then its
/// notification) are not transactional: each write is atomic on its own,
/// and a later step failing does not undo an earlier one. Read-modify-write
/// operations are last-writer-wins.
///
/// # Example
///
/// ```rust
/// use admitdb_admission::{AdmissionDb, NewStudent};
///
/// let store = AdmissionDb::in_memory();
/// store.open().unwrap();
///
/// let outcome = store.register_student(NewStudent {
///     email: Some("alice@example.com".into()),
///     name: Some("Alice".into()),
///     ..NewStudent::default()
/// });
/// assert!(outcome.success);
/// ```
pub struct AdmissionDb {
    db: Arc<Database>,
    config: AdmissionConfig,
    listener: RwLock<Option<Arc<dyn NotificationListener>>>,
}

impl AdmissionDb {
    /// Wraps an existing database handle.
    pub fn new(db: Arc<Database>, config: AdmissionConfig) -> Self {
        Self {
            db,
            config,
            listener: RwLock::new(None),
        }
    }

    /// Creates a store over a fresh in-memory engine.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(Database::in_memory()), AdmissionConfig::default())
    }

    /// Creates a store over a file engine at `path`.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the directory cannot be opened or locked.
    pub fn at_path(path: &Path, config: AdmissionConfig) -> CoreResult<Self> {
        let db = Database::at_path(path, config.core.clone())?;
        Ok(Self::new(Arc::new(db), config))
    }

    /// Opens the database with the admission schema.
    ///
    /// # Errors
    ///
    /// Returns an initialization error; the status becomes `error`.
    pub fn open(&self) -> CoreResult<()> {
        self.db.open(&admission_schema())
    }

    /// Closes the database.
    ///
    /// # Errors
    ///
    /// Returns an engine error if the final flush fails.
    pub fn close(&self) -> CoreResult<()> {
        self.db.close()
    }

    /// Returns the shared database handle.
    #[must_use]
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Returns the admission configuration.
    #[must_use]
    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Returns the current database status.
    #[must_use]
    pub fn status(&self) -> DatabaseStatus {
        self.db.status()
    }

    /// Installs or removes the status listener.
    pub fn set_status_listener(&self, listener: Option<Arc<dyn StatusListener>>) {
        self.db.set_status_listener(listener);
    }

    /// Installs or removes the notification listener.
    pub fn set_notification_listener(&self, listener: Option<Arc<dyn NotificationListener>>) {
        *self.listener.write() = listener;
    }

    /// Reads a record, applies `change` to its fields and writes it back.
    ///
    /// Fields the change does not touch are written back exactly as they
    /// were stored. Returns the updated record, or `None` if `id` is absent.
    fn modify<F>(&self, collection: &str, id: &RecordKey, change: F) -> CoreResult<Option<Value>>
    where
        F: FnOnce(&mut Map<String, Value>) -> CoreResult<()>,
    {
        let Some(mut record) = self.db.get(collection, id)? else {
            return Ok(None);
        };
        let fields = record.as_object_mut().ok_or_else(|| {
            CoreError::serialization(format!("record {id} in {collection} is not an object"))
        })?;
        change(fields)?;
        self.db.update(collection, record.clone())?;
        Ok(Some(record))
    }

    /// Pushes a student's unread count to the listener, if any.
    fn refresh_badge(&self, student_id: Option<&RecordKey>) {
        let Some(student_id) = student_id else {
            return;
        };
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            let unread = self.get_unread_notifications(student_id).len();
            listener.unread_changed(student_id, unread);
        }
    }
}

impl std::fmt::Debug for AdmissionDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionDb")
            .field("db", &self.db)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decodes stored records, skipping any that do not fit the typed view.
fn decode_all<R: Record>(values: Vec<Value>) -> Vec<R> {
    values
        .into_iter()
        .filter_map(|value| match R::from_record(value) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection = R::COLLECTION, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Returns the query result, or an empty list after logging the failure.
fn or_empty<T>(operation: &str, result: CoreResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|err| {
        tracing::error!(operation, error = %err, "query failed");
        Vec::new()
    })
}
