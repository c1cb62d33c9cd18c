//! # AdmitDB Admission
//!
//! College admission workflows on top of AdmitDB core.
//!
//! This crate provides:
//! - The admission collection registry ([`admission_schema`])
//! - Typed records and the factory functions that stamp ids, timestamps
//!   and defaults ([`records`])
//! - [`AdmissionDb`], the context object that runs domain operations
//! - Linear-scan application search
//! - Snapshot export, batched import, backup and restore
//!
//! Domain operations return an [`Outcome`] instead of an error. Query
//! operations return plain lists, empty on failure.
//!
//! ## Example
//!
//! ```rust
//! use admitdb_admission::{AdmissionDb, NewApplication, NewStudent};
//!
//! let store = AdmissionDb::in_memory();
//! store.open().unwrap();
//!
//! let student = store.register_student(NewStudent {
//!     email: Some("alice@example.com".into()),
//!     ..NewStudent::default()
//! });
//! let student_id = student.payload.unwrap().id;
//!
//! let application = store.create_application(NewApplication {
//!     student_id: Some(student_id.clone()),
//!     stream: Some("Science".into()),
//!     ..NewApplication::default()
//! });
//! assert!(application.success);
//! assert_eq!(store.get_unread_notifications(&student_id).len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod ids;
mod lenient;
mod outcome;
pub mod records;
mod schema;
mod service;

pub use config::{AdmissionConfig, SCHEMA_VERSION};
pub use outcome::{BackupFile, CreatedRecord, CreatedWithCollegeId, Done, ImportReport, Outcome};
pub use records::{
    AnalyticsEntry, Application, Comment, Document, DocumentStatus, NewApplication, NewDocument,
    NewNotification, NewStream, NewStudent, Notification, Preferences, Record, Stream, Student,
};
pub use schema::{
    admission_schema, ANALYTICS, APPLICATIONS, DOCUMENTS, MERIT_LISTS, NOTIFICATIONS,
    SNAPSHOT_COLLECTIONS, STREAMS, STUDENTS,
};
pub use service::{AdmissionDb, Backup, DateRange, NotificationListener, Snapshot};

pub use admitdb_core::{DatabaseStatus, ErrorKind, RecordKey, StatusListener};
