//! Admission collection registry.

use crate::config::SCHEMA_VERSION;
use admitdb_core::{CollectionSpec, IndexSpec, Schema};

/// Applications submitted by students.
pub const APPLICATIONS: &str = "applications";
/// Uploaded documents.
pub const DOCUMENTS: &str = "documents";
/// Registered students.
pub const STUDENTS: &str = "students";
/// Merit list entries.
pub const MERIT_LISTS: &str = "meritlists";
/// Analytics entries.
pub const ANALYTICS: &str = "analytics";
/// Student notifications.
pub const NOTIFICATIONS: &str = "notifications";
/// Academic streams.
pub const STREAMS: &str = "streams";

/// Collections carried by export, import and backup snapshots.
pub const SNAPSHOT_COLLECTIONS: [&str; 4] = [APPLICATIONS, DOCUMENTS, STUDENTS, NOTIFICATIONS];

/// Returns the admission schema.
///
/// Every collection uses auto-increment keys; the record factory supplies
/// string ids, so auto keys only apply to records written without one.
#[must_use]
pub fn admission_schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .collection(
            CollectionSpec::new(APPLICATIONS)
                .index(IndexSpec::on("studentId"))
                .index(IndexSpec::on("status"))
                .index(IndexSpec::on("stream"))
                .index(IndexSpec::on("date")),
        )
        .collection(
            CollectionSpec::new(DOCUMENTS)
                .index(IndexSpec::on("applicationId"))
                .index(IndexSpec::on("type"))
                .index(IndexSpec::on("status"))
                .index(IndexSpec::on("uploadDate")),
        )
        .collection(
            CollectionSpec::new(STUDENTS)
                .index(IndexSpec::on("email").unique())
                .index(IndexSpec::on("phone"))
                .index(IndexSpec::on("registrationDate")),
        )
        .collection(
            CollectionSpec::new(MERIT_LISTS)
                .index(IndexSpec::on("stream"))
                .index(IndexSpec::on("year"))
                .index(IndexSpec::on("rank")),
        )
        .collection(
            CollectionSpec::new(ANALYTICS)
                .index(IndexSpec::on("metric"))
                .index(IndexSpec::on("date")),
        )
        .collection(
            CollectionSpec::new(NOTIFICATIONS)
                .index(IndexSpec::on("studentId"))
                .index(IndexSpec::on("type"))
                .index(IndexSpec::on("date"))
                .index(IndexSpec::on("read")),
        )
        .collection(
            CollectionSpec::new(STREAMS)
                .index(IndexSpec::on("name").unique())
                .index(IndexSpec::on("code"))
                .index(IndexSpec::on("createdAt")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_valid() {
        let schema = admission_schema();
        schema.validate().unwrap();
        assert_eq!(schema.version, SCHEMA_VERSION);
        assert_eq!(schema.collections.len(), 7);
    }

    #[test]
    fn unique_indexes() {
        let schema = admission_schema();
        let unique: Vec<_> = schema
            .collections
            .iter()
            .flat_map(|c| c.indexes.iter().filter(|i| i.unique).map(|i| (c.name.as_str(), i.name.as_str())))
            .collect();
        assert_eq!(unique, vec![(STUDENTS, "email"), (STREAMS, "name")]);
    }

    #[test]
    fn snapshot_collections_are_registered() {
        let schema = admission_schema();
        for name in SNAPSHOT_COLLECTIONS {
            assert!(schema.get(name).is_some());
        }
    }
}
