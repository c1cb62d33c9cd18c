//! Stream commands.

use super::{expect_success, open_store, print_json};
use admitdb_admission::NewStream;
use admitdb_core::RecordKey;
use std::path::Path;

/// Prints all streams.
pub fn list(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    print_json(&store.admission.get_all_streams())
}

/// Adds a stream.
pub fn add(path: &Path, name: String, code: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let created = expect_success(store.admission.add_stream(NewStream { name, code }))?;
    print_json(&created)
}

/// Deletes a stream by id.
pub fn delete(path: &Path, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    expect_success(store.admission.delete_stream(&RecordKey::parse_lenient(id)))?;
    println!("✓ Stream {id} deleted");
    Ok(())
}
