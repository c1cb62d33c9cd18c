//! Compact command implementation.

use super::open_store;
use std::path::Path;

/// Runs the compact command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let before = store.engine.journal_size()?;

    println!("Compacting journal at {}", path.display());
    store.engine.compact()?;
    let after = store.engine.journal_size()?;

    println!("  Size before: {before} bytes");
    println!("  Size after:  {after} bytes");
    println!("✓ Compaction complete");
    Ok(())
}
