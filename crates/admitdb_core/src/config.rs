//! Database configuration.

use admitdb_storage::FileEngineConfig;

/// Configuration for a [`Database`](crate::Database).
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the database directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync the journal on every write (safer but slower).
    pub sync_on_write: bool,

    /// Whether `close` flushes the engine.
    pub flush_on_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
            flush_on_close: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync on every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether `close` flushes the engine.
    #[must_use]
    pub const fn flush_on_close(mut self, value: bool) -> Self {
        self.flush_on_close = value;
        self
    }

    /// Derives the file engine settings from this configuration.
    #[must_use]
    pub fn file_engine_config(&self) -> FileEngineConfig {
        FileEngineConfig::default()
            .create_if_missing(self.create_if_missing)
            .sync_on_write(self.sync_on_write)
    }
}
