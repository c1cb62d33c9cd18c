//! Test fixtures and database helpers.

use admitdb_core::{Config, Database};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Arc<Database>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database. It is not opened yet.
    pub fn memory() -> Self {
        Self {
            db: Arc::new(Database::in_memory()),
            temp_dir: None,
        }
    }

    /// Creates a new file-backed test database in a temp directory.
    /// Sync on write is off to keep tests fast.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::at_path(temp_dir.path(), Config::default().sync_on_write(false))
            .expect("Failed to open file database");
        Self {
            db: Arc::new(db),
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database directory if file-backed, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Drops the current handle and opens a new one on the same directory.
    ///
    /// # Panics
    ///
    /// Panics for in-memory databases or if another handle is still alive.
    pub fn reopen(self) -> Self {
        let temp_dir = self.temp_dir.expect("reopen requires a file database");
        drop(self.db);
        let db = Database::at_path(temp_dir.path(), Config::default().sync_on_write(false))
            .expect("Failed to reopen file database");
        Self {
            db: Arc::new(db),
            temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let db = TestDatabase::memory();
    f(&db)
}

/// Runs a test with a temporary file-backed database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let db = TestDatabase::file();
    f(&db)
}
