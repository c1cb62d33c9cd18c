//! CLI command implementations.

pub mod compact;
pub mod init;
pub mod inspect;
pub mod records;
pub mod streams;
pub mod transfer;

use admitdb_admission::{AdmissionConfig, AdmissionDb, Outcome};
use admitdb_core::{Database, FileEngine};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

/// An opened admission store and the file engine under it.
pub struct Store {
    /// The admission store.
    pub admission: AdmissionDb,
    /// The engine, kept for maintenance operations.
    pub engine: Arc<FileEngine>,
}

/// Opens the store at `path` and applies the admission schema.
///
/// Only `init` may create a missing directory.
pub fn open_store(path: &Path, create: bool) -> Result<Store, Box<dyn Error>> {
    let config = AdmissionConfig::default();
    let core = config.core.clone().create_if_missing(create);
    if !create && !path.exists() {
        return Err(format!("No database found at {}", path.display()).into());
    }

    let engine = Arc::new(FileEngine::open(path, core.file_engine_config())?);
    let db = Database::new(engine.clone(), core);
    let admission = AdmissionDb::new(Arc::new(db), config);
    admission.open()?;
    Ok(Store { admission, engine })
}

/// Unwraps a successful outcome or turns its error message into an error.
pub fn expect_success<T>(outcome: Outcome<T>) -> Result<T, Box<dyn Error>> {
    match outcome.payload {
        Some(payload) if outcome.success => Ok(payload),
        _ => Err(outcome
            .error
            .unwrap_or_else(|| "operation failed".to_string())
            .into()),
    }
}

/// Prints a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
