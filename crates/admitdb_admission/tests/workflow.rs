//! End-to-end admission workflows.

use admitdb_admission::{
    AdmissionConfig, AdmissionDb, DatabaseStatus, DateRange, ErrorKind, NewApplication,
    NewDocument, NewNotification, NewStudent, RecordKey, Snapshot, StatusListener, APPLICATIONS,
    DOCUMENTS, NOTIFICATIONS, SCHEMA_VERSION, STUDENTS,
};
use admitdb_core::{Config, Database, MemoryEngine, StorageEngine};
use admitdb_testkit::prelude::*;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn store() -> AdmissionDb {
    let store = AdmissionDb::in_memory();
    store.open().unwrap();
    store
}

fn student(store: &AdmissionDb, name: &str, email: &str) -> RecordKey {
    store
        .register_student(NewStudent {
            name: Some(name.into()),
            email: Some(email.into()),
            ..NewStudent::default()
        })
        .payload
        .unwrap()
        .id
}

fn is_college_id(id: &str) -> bool {
    id.len() == 10
        && id.starts_with("IC")
        && id[2..].chars().all(|c| c.is_ascii_digit())
}

#[derive(Default)]
struct StatusLog(Mutex<Vec<DatabaseStatus>>);

impl StatusListener for StatusLog {
    fn status_changed(&self, status: DatabaseStatus) {
        self.0.lock().push(status);
    }
}

#[test]
fn application_lifecycle() {
    let store = store();
    let student_id = student(&store, "Alice Rao", "alice@example.com");

    let created = store
        .create_application(NewApplication {
            student_id: Some(student_id.clone()),
            stream: Some("Science".into()),
            ..NewApplication::default()
        })
        .payload
        .unwrap();
    assert!(is_college_id(&created.college_id));

    let application = store.get_application(&created.id).unwrap();
    assert_eq!(application.status, "pending");

    let unread = store.get_unread_notifications(&student_id);
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, "application_submitted");
    assert_eq!(unread[0].message, "Your application has been submitted successfully");
}

#[test]
fn document_upload_and_verify() {
    let store = store();
    let student_id = student(&store, "Bo", "bo@example.com");
    let doc_id = store
        .upload_document(NewDocument {
            student_id: Some(student_id.clone()),
            doc_type: Some("marksheet".into()),
            ..NewDocument::default()
        })
        .payload
        .unwrap()
        .id;

    assert!(store.verify_document(&doc_id, "admin1", "looks good").success);

    let document = store.get_document(&doc_id).unwrap();
    assert!(document.verified_by.as_deref() == Some("admin1"));
    assert_eq!(document.comments.len(), 1);

    let messages: Vec<String> = store
        .get_unread_notifications(&student_id)
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert!(messages.contains(&"Document marksheet uploaded successfully".to_string()));
    assert!(messages.contains(&"Document marksheet has been verified".to_string()));
}

#[test]
fn verify_missing_document_writes_nothing() {
    let store = store();
    let outcome = store.verify_document(&"missing".into(), "admin1", "");
    assert!(!outcome.success);
    assert_eq!(outcome.kind, Some(ErrorKind::NotFound));
    assert_eq!(store.database().count(NOTIFICATIONS).unwrap(), 0);
}

#[test]
fn duplicate_email_rejected() {
    let store = store();
    student(&store, "A", "same@example.com");
    let outcome = store.register_student(NewStudent {
        email: Some("same@example.com".into()),
        ..NewStudent::default()
    });
    assert!(!outcome.success);
    assert_eq!(outcome.kind, Some(ErrorKind::ConstraintViolation));
    assert_eq!(store.database().count(STUDENTS).unwrap(), 1);
}

#[test]
fn mark_read_is_idempotent() {
    let store = store();
    let id = store
        .create_notification(NewNotification::new(Some("s1".into()), "info", "hello"))
        .payload
        .unwrap()
        .id;

    assert!(store.mark_notification_as_read(&id).success);
    assert!(store.mark_notification_as_read(&id).success);
    assert!(store.get_unread_notifications(&"s1".into()).is_empty());
}

#[test]
fn search_joins_students() {
    let store = store();
    let alice = student(&store, "Alice Rao", "alice@example.com");
    let bob = student(&store, "Bob Iyer", "bob@example.com");
    for (id, stream) in [(&alice, "Science"), (&bob, "Commerce")] {
        store.create_application(NewApplication {
            student_id: Some(id.clone()),
            stream: Some(stream.into()),
            ..NewApplication::default()
        });
    }
    // Orphan: never matches.
    store.create_application(NewApplication {
        student_id: Some("ghost".into()),
        stream: Some("Science".into()),
        ..NewApplication::default()
    });

    assert_eq!(store.search_applications("ALICE").len(), 1);
    assert_eq!(store.search_applications("science").len(), 1);
    assert_eq!(store.search_applications("example.com").len(), 2);
    assert_eq!(store.search_applications("IC").len(), 2);
    assert!(store.search_applications("nobody").is_empty());
}

#[test]
fn analytics_range_is_inclusive() {
    let store = store();
    for (day, visits) in [("2024-01-01", 1), ("2024-01-15", 2), ("2024-02-01", 3)] {
        store
            .database()
            .add(
                "analytics",
                json!({"metric": "visits", "data": visits, "date": format!("{day}T00:00:00.000Z")}),
            )
            .unwrap();
    }
    store.update_analytics("signups", json!(5));

    assert_eq!(store.get_analytics_data("visits", None).len(), 3);
    let january = DateRange::new("2024-01-01", "2024-01-31");
    assert_eq!(store.get_analytics_data("visits", Some(&january)).len(), 2);
    let inverted = DateRange::new("2024-02-01", "2024-01-01");
    assert!(store.get_analytics_data("visits", Some(&inverted)).is_empty());
}

#[test]
fn uninitialized_store_reports_not_initialized() {
    let store = AdmissionDb::in_memory();
    assert_eq!(store.status(), DatabaseStatus::NotInitialized);

    let outcome = store.register_student(NewStudent::default());
    assert_eq!(outcome.kind, Some(ErrorKind::NotInitialized));
    assert!(store.search_applications("x").is_empty());
    assert!(store.export_data().kind == Some(ErrorKind::NotInitialized));
}

#[test]
fn failed_open_sets_error_status() {
    let engine = MemoryEngine::new();
    engine.set_version(SCHEMA_VERSION + 1).unwrap();
    let db = Database::new(Arc::new(engine), Config::default());
    let store = AdmissionDb::new(Arc::new(db), AdmissionConfig::default());

    let err = store.open().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Initialization);
    assert_eq!(store.status(), DatabaseStatus::Error);
}

#[test]
fn notification_failure_does_not_fail_application() {
    let engine = Arc::new(FaultyEngine::new());
    let db = Database::new(engine.clone(), Config::default());
    let store = AdmissionDb::new(Arc::new(db), AdmissionConfig::default());
    store.open().unwrap();
    engine.fail_writes_to(NOTIFICATIONS);

    let outcome = store.create_application(NewApplication {
        student_id: Some("s1".into()),
        ..NewApplication::default()
    });
    assert!(outcome.success);
    assert_eq!(store.database().count(APPLICATIONS).unwrap(), 1);
    assert_eq!(store.database().count(NOTIFICATIONS).unwrap(), 0);

    // A direct write to the failing store is an engine error.
    let direct = store.create_notification(NewNotification::new(None, "info", "x"));
    assert_eq!(direct.kind, Some(ErrorKind::Engine));
}

#[tokio::test]
async fn export_import_round_trip() {
    let source = store();
    let alice = student(&source, "Alice", "alice@example.com");
    source.create_application(NewApplication {
        student_id: Some(alice.clone()),
        stream: Some("Arts".into()),
        ..NewApplication::default()
    });
    source.upload_document(NewDocument {
        student_id: Some(alice),
        doc_type: Some("photo".into()),
        ..NewDocument::default()
    });

    let snapshot = source.export_data().payload.unwrap();
    let target = AdmissionDb::new(
        Arc::new(Database::in_memory()),
        AdmissionConfig::default().import_batch_delay(Duration::ZERO),
    );
    target.open().unwrap();

    let report = target.import_data(&snapshot).await.payload.unwrap();
    assert_eq!(report.collections, 4);
    assert_eq!(report.records, snapshot.record_count());

    let exported = target.export_data().payload.unwrap();
    assert_eq!(exported.applications, snapshot.applications);
    assert_eq!(exported.documents, snapshot.documents);
    assert_eq!(exported.students, snapshot.students);
    assert_eq!(exported.notifications, snapshot.notifications);
    assert_eq!(target.search_applications("alice").len(), 1);
}

#[tokio::test]
async fn imported_records_keep_their_shape_through_updates() {
    let store = AdmissionDb::new(
        Arc::new(Database::in_memory()),
        AdmissionConfig::default().import_batch_delay(Duration::ZERO),
    );
    store.open().unwrap();
    let old_comment = json!({"adminId": 7, "comment": "blurry", "date": "2024-01-01", "pass": 1});
    let snapshot = Snapshot {
        notifications: Some(vec![json!({
            "id": "n1", "studentId": "s1", "type": null, "message": "legacy", "read": false,
            "channel": "sms",
        })]),
        documents: Some(vec![json!({
            "id": "d1", "studentId": "s1", "type": null, "status": "pending",
            "verificationDate": null, "comments": [old_comment.clone()], "pages": 2,
        })]),
        ..Snapshot::default()
    };
    assert!(store.import_data(&snapshot).await.success);

    let n1 = RecordKey::from("n1");
    assert_eq!(store.get_unread_notifications(&"s1".into()).len(), 1);
    assert!(store.mark_notification_as_read(&n1).success);
    let stored = store.database().get(NOTIFICATIONS, &n1).unwrap().unwrap();
    assert_eq!(stored["read"], true);
    assert_eq!(stored["type"], serde_json::Value::Null);
    assert_eq!(stored["channel"], "sms");
    assert!(store.get_unread_notifications(&"s1".into()).is_empty());

    let d1 = RecordKey::from("d1");
    assert!(store.verify_document(&d1, "admin9", "fine").success);
    let stored = store.database().get(DOCUMENTS, &d1).unwrap().unwrap();
    assert_eq!(stored["status"], "verified");
    assert_eq!(stored["verifiedBy"], "admin9");
    assert_eq!(stored["type"], serde_json::Value::Null);
    assert_eq!(stored["pages"], 2);
    assert_eq!(stored["comments"][0], old_comment);
    assert_eq!(stored["comments"][1]["adminId"], "admin9");

    let unread = store.get_unread_notifications(&"s1".into());
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].message, "Document  has been verified");
}

#[tokio::test]
async fn import_clash_stops_with_error_status() {
    let store = AdmissionDb::new(
        Arc::new(Database::in_memory()),
        AdmissionConfig::default().import_batch_delay(Duration::ZERO),
    );
    store.open().unwrap();
    let snapshot = Snapshot {
        students: Some(vec![
            json!({"email": "dup@example.com"}),
            json!({"email": "dup@example.com"}),
        ]),
        ..Snapshot::default()
    };

    let outcome = store.import_data(&snapshot).await;
    assert_eq!(outcome.kind, Some(ErrorKind::ConstraintViolation));
    assert_eq!(store.status(), DatabaseStatus::Error);
    assert_eq!(store.database().count(STUDENTS).unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn import_pauses_after_every_batch() {
    let store = store();
    let log = Arc::new(StatusLog::default());
    store.set_status_listener(Some(log.clone()));

    let students = (0..120)
        .map(|i| json!({"email": format!("s{i}@example.com")}))
        .collect();
    let snapshot = Snapshot {
        students: Some(students),
        ..Snapshot::default()
    };

    let started = tokio::time::Instant::now();
    let report = store.import_data(&snapshot).await.payload.unwrap();
    assert_eq!(report.records, 120);
    assert_eq!(report.batches, 3);
    assert_eq!(report.pauses, 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(store.database().get_all(STUDENTS).unwrap().len(), 120);

    assert_eq!(
        *log.0.lock(),
        vec![DatabaseStatus::Syncing, DatabaseStatus::Connected]
    );
}

#[tokio::test]
async fn backup_restore_through_file() {
    let source = store();
    student(&source, "Alice", "alice@example.com");
    let backup = source.backup_database().payload.unwrap();
    assert!(backup.file_name.starts_with("college_backup_"));
    assert!(backup.file_name.ends_with(".json"));
    assert_eq!(backup.size, backup.contents.len());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&backup.file_name);
    std::fs::write(&path, &backup.contents).unwrap();

    let target = AdmissionDb::new(
        Arc::new(Database::in_memory()),
        AdmissionConfig::default().import_batch_delay(Duration::ZERO),
    );
    target.open().unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(target.restore_backup(&bytes).await.success);
    assert!(target.find_student_by_email("alice@example.com").is_some());
}

#[tokio::test]
async fn restore_rejects_newer_backup() {
    let store = store();
    let bytes = serde_json::to_vec(&json!({
        "students": [],
        "backupDate": "2030-01-01T00:00:00.000Z",
        "version": SCHEMA_VERSION + 1,
    }))
    .unwrap();
    let outcome = store.restore_backup(&bytes).await;
    assert_eq!(outcome.kind, Some(ErrorKind::Serialization));
    assert_eq!(store.status(), DatabaseStatus::Connected);
}

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let store = AdmissionDb::at_path(dir.path(), AdmissionConfig::default()).unwrap();
        store.open().unwrap();
        let id = student(&store, "Alice", "alice@example.com");
        store.close().unwrap();
        id
    };

    let store = AdmissionDb::at_path(dir.path(), AdmissionConfig::default()).unwrap();
    store.open().unwrap();
    assert_eq!(store.get_student(&id).unwrap().name.as_deref(), Some("Alice"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn distinct_emails_all_register(emails in distinct_emails_strategy(8)) {
        let store = store();
        for email in &emails {
            let outcome = store.register_student(NewStudent {
                email: Some(email.clone()),
                ..NewStudent::default()
            });
            prop_assert!(outcome.success);
        }
        for email in &emails {
            prop_assert!(store.find_student_by_email(email).is_some());
        }
    }
}
