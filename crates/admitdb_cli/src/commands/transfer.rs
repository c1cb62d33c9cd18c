//! Export, import, backup and restore commands.

use super::{expect_success, open_store, print_json};
use std::fs;
use std::path::{Path, PathBuf};

/// Exports a snapshot to `output`, or to stdout.
pub fn export(path: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let snapshot = expect_success(store.admission.export_data())?;

    match output {
        Some(file) => {
            fs::write(file, serde_json::to_vec_pretty(&snapshot)?)?;
            println!(
                "✓ Exported {} records to {}",
                snapshot.record_count(),
                file.display()
            );
        }
        None => print_json(&snapshot)?,
    }
    Ok(())
}

/// Imports a JSON snapshot file.
pub async fn import(path: &Path, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let bytes = fs::read(file)?;
    let report = expect_success(store.admission.import_json(&bytes).await)?;

    println!(
        "✓ Imported {} records from {} collections in {} batches",
        report.records, report.collections, report.batches
    );
    store.admission.close()?;
    Ok(())
}

/// Writes a backup file into `dir` and returns its path.
pub fn backup(path: &Path, dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let file = expect_success(store.admission.backup_database())?;

    fs::create_dir_all(dir)?;
    let target = dir.join(&file.file_name);
    fs::write(&target, &file.contents)?;

    println!("✓ Backup written to {} ({} bytes)", target.display(), file.size);
    Ok(target)
}

/// Restores a backup file.
pub async fn restore(path: &Path, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let bytes = fs::read(file)?;
    let report = expect_success(store.admission.restore_backup(&bytes).await)?;

    println!("✓ Restored {} records", report.records);
    store.admission.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admitdb_admission::NewStudent;

    #[tokio::test]
    async fn backup_then_restore_into_new_store() {
        let source = tempfile::tempdir().unwrap();
        {
            let store = open_store(source.path(), true).unwrap();
            let outcome = store.admission.register_student(NewStudent {
                email: Some("a@example.com".into()),
                ..NewStudent::default()
            });
            assert!(outcome.success);
        }

        let out = tempfile::tempdir().unwrap();
        let file = backup(source.path(), out.path()).unwrap();
        assert!(file.exists());

        let target = tempfile::tempdir().unwrap();
        drop(open_store(target.path(), true).unwrap());
        restore(target.path(), &file).await.unwrap();

        let store = open_store(target.path(), false).unwrap();
        assert!(store
            .admission
            .find_student_by_email("a@example.com")
            .is_some());
    }

    #[tokio::test]
    async fn import_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        drop(open_store(dir.path(), true).unwrap());
        let file = dir.path().join("bad.json");
        fs::write(&file, b"not json").unwrap();
        assert!(import(dir.path(), &file).await.is_err());
    }
}
