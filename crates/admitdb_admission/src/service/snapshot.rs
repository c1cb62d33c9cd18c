//! Whole-database snapshots: export, batched import, backup and restore.
//!
//! Snapshots carry applications, documents, students and notifications.
//! Streams, analytics and merit lists are not part of a snapshot, so a
//! backup does not include them either.

use super::AdmissionDb;
use crate::config::SCHEMA_VERSION;
use crate::ids::{now_iso, today};
use crate::outcome::{BackupFile, ImportReport, Outcome};
use crate::schema::{APPLICATIONS, DOCUMENTS, NOTIFICATIONS, STUDENTS};
use admitdb_core::{CoreError, CoreResult, DatabaseStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A point-in-time copy of the snapshot collections.
///
/// When importing, absent collections are skipped and unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Application records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applications: Option<Vec<Value>>,
    /// Document records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<Value>>,
    /// Student records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<Value>>,
    /// Notification records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Value>>,
    /// When the snapshot was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
}

impl Snapshot {
    /// Returns each snapshot collection with its records, in import order.
    #[must_use]
    pub fn collections(&self) -> [(&'static str, Option<&Vec<Value>>); 4] {
        [
            (APPLICATIONS, self.applications.as_ref()),
            (DOCUMENTS, self.documents.as_ref()),
            (STUDENTS, self.students.as_ref()),
            (NOTIFICATIONS, self.notifications.as_ref()),
        ]
    }

    /// Returns the total number of records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.collections()
            .iter()
            .filter_map(|(_, records)| *records)
            .map(Vec::len)
            .sum()
    }
}

/// A snapshot plus backup metadata, as written to a backup file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Exported collections.
    #[serde(flatten)]
    pub snapshot: Snapshot,
    /// When the backup was taken.
    pub backup_date: String,
    /// Schema version of the exporting store.
    pub version: u32,
}

impl AdmissionDb {
    /// Exports the snapshot collections. Pure read.
    pub fn export_data(&self) -> Outcome<Snapshot> {
        Outcome::from_result("export data", self.try_export())
    }

    fn try_export(&self) -> CoreResult<Snapshot> {
        Ok(Snapshot {
            applications: Some(self.db.get_all(APPLICATIONS)?),
            documents: Some(self.db.get_all(DOCUMENTS)?),
            students: Some(self.db.get_all(STUDENTS)?),
            notifications: Some(self.db.get_all(NOTIFICATIONS)?),
            export_date: Some(now_iso()),
        })
    }

    /// Imports a snapshot in batches, pausing after every batch.
    ///
    /// Records are written one `add` at a time, so a key or unique-index
    /// clash stops the import. Batches written before the failure stay
    /// written. The status is `syncing` while running, then `connected` or
    /// `error`.
    pub async fn import_data(&self, snapshot: &Snapshot) -> Outcome<ImportReport> {
        self.db.set_status(DatabaseStatus::Syncing);
        match self.run_import(snapshot).await {
            Ok(report) => {
                self.db.set_status(DatabaseStatus::Connected);
                tracing::info!(
                    collections = report.collections,
                    records = report.records,
                    batches = report.batches,
                    "import finished"
                );
                Outcome::ok(report)
            }
            Err(err) => {
                self.db.set_status(DatabaseStatus::Error);
                Outcome::from_result("import data", Err(err))
            }
        }
    }

    async fn run_import(&self, snapshot: &Snapshot) -> CoreResult<ImportReport> {
        self.db.schema_version()?;
        let batch_size = self.config.import_batch_size.max(1);
        let delay = self.config.import_batch_delay;
        let mut report = ImportReport::default();

        for (collection, records) in snapshot.collections() {
            let Some(records) = records else {
                continue;
            };
            report.collections += 1;

            for batch in records.chunks(batch_size) {
                for record in batch {
                    self.db.add(collection, record.clone())?;
                    report.records += 1;
                }
                report.batches += 1;
                tracing::debug!(
                    collection,
                    batch = report.batches,
                    written = report.records,
                    "import batch written"
                );
                tokio::time::sleep(delay).await;
                report.pauses += 1;
            }
        }
        Ok(report)
    }

    /// Parses a JSON snapshot and imports it.
    pub async fn import_json(&self, bytes: &[u8]) -> Outcome<ImportReport> {
        match serde_json::from_slice::<Snapshot>(bytes) {
            Ok(snapshot) => self.import_data(&snapshot).await,
            Err(err) => Outcome::from_result("import json", Err(err.into())),
        }
    }

    /// Exports the snapshot with backup metadata as pretty-printed JSON.
    ///
    /// The file name is `<prefix>_<YYYY-MM-DD>.json`.
    pub fn backup_database(&self) -> Outcome<BackupFile> {
        Outcome::from_result("backup database", self.try_backup())
    }

    fn try_backup(&self) -> CoreResult<BackupFile> {
        let backup = Backup {
            snapshot: self.try_export()?,
            backup_date: now_iso(),
            version: SCHEMA_VERSION,
        };
        let contents = serde_json::to_vec_pretty(&backup)?;
        let file_name = format!("{}_{}.json", self.config.backup_file_prefix, today());
        tracing::info!(%file_name, records = backup.snapshot.record_count(), "backup created");
        Ok(BackupFile {
            file_name,
            size: contents.len(),
            contents,
        })
    }

    /// Restores a backup file produced by [`AdmissionDb::backup_database`].
    ///
    /// Backups from a newer schema version are rejected.
    pub async fn restore_backup(&self, bytes: &[u8]) -> Outcome<ImportReport> {
        let backup = match serde_json::from_slice::<Backup>(bytes) {
            Ok(backup) => backup,
            Err(err) => return Outcome::from_result("restore backup", Err(err.into())),
        };
        if backup.version > SCHEMA_VERSION {
            let err = CoreError::serialization(format!(
                "backup schema version {} is newer than {SCHEMA_VERSION}",
                backup.version
            ));
            return Outcome::from_result("restore backup", Err(err));
        }
        tracing::info!(backup_date = %backup.backup_date, "restoring backup");
        self.import_data(&backup.snapshot).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_ignored_and_missing_skipped() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "students": [{"email": "a@x.com"}],
            "streams": [{"name": "ignored"}],
        }))
        .unwrap();
        assert!(snapshot.applications.is_none());
        assert_eq!(snapshot.record_count(), 1);
    }

    #[test]
    fn backup_flattens_snapshot() {
        let backup = Backup {
            snapshot: Snapshot {
                applications: Some(vec![]),
                export_date: Some("2024-01-01T00:00:00.000Z".into()),
                ..Snapshot::default()
            },
            backup_date: "2024-01-01T00:00:01.000Z".into(),
            version: 2,
        };
        assert_eq!(
            serde_json::to_value(&backup).unwrap(),
            json!({
                "applications": [],
                "exportDate": "2024-01-01T00:00:00.000Z",
                "backupDate": "2024-01-01T00:00:01.000Z",
                "version": 2,
            })
        );
    }
}
