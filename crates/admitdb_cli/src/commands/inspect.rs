//! Inspect command implementation.

use super::{open_store, print_json};
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// Stored schema version.
    pub schema_version: u32,
    /// Journal size in bytes.
    pub journal_size: u64,
    /// Per-collection statistics.
    pub collections: Vec<CollectionStats>,
}

/// Statistics for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Collection name.
    pub name: String,
    /// Number of records.
    pub record_count: usize,
    /// Declared index names.
    pub indexes: Vec<String>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(path)?;
    match format {
        "json" => print_json(&result)?,
        _ => print_text_output(&result),
    }
    Ok(())
}

/// Collects statistics for the store at `path`.
pub fn inspect(path: &Path) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let db = store.admission.database();

    let mut collections = Vec::new();
    for name in db.collection_names()? {
        collections.push(CollectionStats {
            record_count: db.count(&name)?,
            indexes: db.index_names(&name)?,
            name,
        });
    }

    Ok(InspectResult {
        path: path.display().to_string(),
        schema_version: db.schema_version()?,
        journal_size: store.engine.journal_size()?,
        collections,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("AdmitDB Store Inspection");
    println!("========================");
    println!();
    println!("Path:           {}", result.path);
    println!("Schema version: {}", result.schema_version);
    println!("Journal size:   {}", format_size(result.journal_size));
    println!();
    println!("Collections:");
    for col in &result.collections {
        println!(
            "  {:<14} {:>6} records  [{}]",
            col.name,
            col.record_count,
            col.indexes.join(", ")
        );
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
