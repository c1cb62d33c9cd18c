//! Admission store configuration.

use admitdb_core::Config;
use std::time::Duration;

/// Schema version of the admission collections.
pub const SCHEMA_VERSION: u32 = 2;

/// Configuration for an [`AdmissionDb`](crate::AdmissionDb).
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Records written per import batch.
    pub import_batch_size: usize,

    /// Pause after each import batch.
    pub import_batch_delay: Duration,

    /// Prefix of backup file names.
    pub backup_file_prefix: String,

    /// Settings for the underlying database.
    pub core: Config,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            import_batch_size: 50,
            import_batch_delay: Duration::from_millis(100),
            backup_file_prefix: "college_backup".to_string(),
            core: Config::default(),
        }
    }
}

impl AdmissionConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the import batch size. Zero is treated as one.
    #[must_use]
    pub fn import_batch_size(mut self, size: usize) -> Self {
        self.import_batch_size = size.max(1);
        self
    }

    /// Sets the pause after each import batch.
    #[must_use]
    pub fn import_batch_delay(mut self, delay: Duration) -> Self {
        self.import_batch_delay = delay;
        self
    }

    /// Sets the backup file name prefix.
    #[must_use]
    pub fn backup_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.backup_file_prefix = prefix.into();
        self
    }

    /// Sets the database settings.
    #[must_use]
    pub fn core(mut self, core: Config) -> Self {
        self.core = core;
        self
    }
}
