//! Student, application and notification commands.

use super::{expect_success, open_store, print_json};
use admitdb_admission::{NewApplication, NewStudent};
use admitdb_core::RecordKey;
use std::path::Path;

/// Registers a student and prints the new ids.
pub fn register_student(
    path: &Path,
    email: String,
    name: Option<String>,
    phone: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let created = expect_success(store.admission.register_student(NewStudent {
        email: Some(email),
        name,
        phone,
        ..NewStudent::default()
    }))?;
    print_json(&created)
}

/// Submits an application and prints the new ids.
pub fn apply(path: &Path, student: &str, stream: String) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let created = expect_success(store.admission.create_application(NewApplication {
        student_id: Some(RecordKey::parse_lenient(student)),
        stream: Some(stream),
        ..NewApplication::default()
    }))?;
    print_json(&created)
}

/// Prints matching applications.
pub fn search(path: &Path, query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    print_json(&store.admission.search_applications(query))
}

/// Prints a student's unread notifications, optionally marking them read.
pub fn notifications(
    path: &Path,
    student: &str,
    mark_read: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path, false)?;
    let unread = store
        .admission
        .get_unread_notifications(&RecordKey::parse_lenient(student));
    print_json(&unread)?;

    if mark_read {
        for notification in &unread {
            expect_success(store.admission.mark_notification_as_read(&notification.id))?;
        }
        eprintln!("✓ Marked {} notifications read", unread.len());
    }
    Ok(())
}
