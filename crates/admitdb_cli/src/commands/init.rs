//! Init command implementation.

use super::open_store;
use std::path::Path;

/// Runs the init command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, true)?;
    let db = store.admission.database();

    println!("✓ Store ready at {}", path.display());
    println!("  Schema version: {}", db.schema_version()?);
    println!("  Collections:    {}", db.collection_names()?.join(", "));

    store.admission.close()?;
    Ok(())
}
