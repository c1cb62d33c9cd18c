//! Admission records and the factory functions that build them.
//!
//! Each `New*` input type captures the fields a caller supplies plus any
//! extra fields in `extra`. Extra fields are kept verbatim in the stored
//! record, but never override a generated field.
//!
//! The stored record types are read-only views. They decode any stored
//! record, including imported ones with nulls or odd types, and updates
//! never go through them: read-modify-write operations edit the stored
//! JSON in place.

use crate::ids::{generate_college_id, generate_id, now_iso};
use crate::lenient;
use crate::schema::{ANALYTICS, APPLICATIONS, DOCUMENTS, NOTIFICATIONS, STREAMS, STUDENTS};
use admitdb_core::{CoreError, CoreResult, RecordKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Status of a newly created application.
pub const APPLICATION_PENDING: &str = "pending";

/// Status of a newly registered student.
pub const STUDENT_ACTIVE: &str = "active";

/// Notification type for a submitted application.
pub const APPLICATION_SUBMITTED: &str = "application_submitted";
/// Notification type for an uploaded document.
pub const DOCUMENT_UPLOADED: &str = "document_uploaded";
/// Notification type for a verified document.
pub const DOCUMENT_VERIFIED: &str = "document_verified";

/// A typed view of a record stored in a known collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    /// Wire names of the typed fields; extra input fields with these names are dropped.
    const FIELDS: &'static [&'static str];

    /// Converts to the stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the record cannot be encoded.
    fn to_record(&self) -> CoreResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parses a stored record.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the record has no valid `id`.
    fn from_record(value: Value) -> CoreResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Drops extra fields that would shadow typed fields.
    fn spread(mut extra: Map<String, Value>) -> Map<String, Value> {
        extra.retain(|key, _| !Self::FIELDS.contains(&key.as_str()));
        extra
    }
}

/// Reads a stored `studentId` as a key, if it is one.
pub(crate) fn student_of(record: &Value) -> Option<RecordKey> {
    record
        .get("studentId")
        .and_then(|value| RecordKey::from_value(value).ok())
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// Input for [`AdmissionDb::create_application`](crate::AdmissionDb::create_application).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    /// Applicant; a weak reference to a student id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RecordKey>,
    /// Stream applied for, by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    /// Any other caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Record id.
    pub id: RecordKey,
    /// Applicant.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_key"
    )]
    pub student_id: Option<RecordKey>,
    /// Stream applied for.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_text"
    )]
    pub stream: Option<String>,
    /// Lifecycle status, starting at `pending`.
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    /// Generated college id.
    #[serde(default, deserialize_with = "lenient::text")]
    pub college_id: String,
    /// Creation timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    /// Extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Application {
    const COLLECTION: &'static str = APPLICATIONS;
    const FIELDS: &'static [&'static str] =
        &["id", "studentId", "stream", "status", "collegeId", "date"];
}

impl Application {
    /// Builds a pending application with fresh ids.
    #[must_use]
    pub fn from_input(input: NewApplication) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            student_id: input.student_id,
            stream: input.stream,
            status: APPLICATION_PENDING.to_string(),
            college_id: generate_college_id(),
            date: now_iso(),
            extra: Self::spread(input.extra),
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Verification state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Awaiting verification.
    #[default]
    Pending,
    /// Verified by an administrator.
    Verified,
    /// A stored status this version does not know.
    #[serde(other)]
    Other,
}

/// An administrator comment on a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Commenting administrator.
    #[serde(default, deserialize_with = "lenient::text")]
    pub admin_id: String,
    /// Comment text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub comment: String,
    /// When the comment was made.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    /// Extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for [`AdmissionDb::upload_document`](crate::AdmissionDb::upload_document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    /// Owning application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<RecordKey>,
    /// Owning student; receives notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RecordKey>,
    /// Document type, e.g. `marksheet`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    /// Any other caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Record id.
    pub id: RecordKey,
    /// Owning application.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_key"
    )]
    pub application_id: Option<RecordKey>,
    /// Owning student.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_key"
    )]
    pub student_id: Option<RecordKey>,
    /// Document type.
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_text"
    )]
    pub doc_type: Option<String>,
    /// Verification state.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: DocumentStatus,
    /// Upload timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub upload_date: String,
    /// Set when verified.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub verification_date: Option<String>,
    /// Verifying administrator.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub verified_by: Option<String>,
    /// Append-only comment log.
    #[serde(default, deserialize_with = "lenient::list")]
    pub comments: Vec<Comment>,
    /// Extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Document {
    const COLLECTION: &'static str = DOCUMENTS;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "applicationId",
        "studentId",
        "type",
        "status",
        "uploadDate",
        "verificationDate",
        "verifiedBy",
        "comments",
    ];
}

impl Document {
    /// Builds a pending, unverified document.
    #[must_use]
    pub fn from_input(input: NewDocument) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            application_id: input.application_id,
            student_id: input.student_id,
            doc_type: input.doc_type,
            status: DocumentStatus::Pending,
            upload_date: now_iso(),
            verification_date: None,
            verified_by: None,
            comments: Vec::new(),
            extra: Self::spread(input.extra),
        }
    }

    /// Returns the type for messages, or an empty string.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.doc_type.as_deref().unwrap_or_default()
    }
}

/// Marks a stored document verified by `admin_id` and appends a comment.
///
/// Only `status`, `verificationDate`, `verifiedBy` and `comments` change;
/// existing comments stay exactly as stored.
///
/// # Errors
///
/// Returns a serialization error if `comments` is neither missing, null
/// nor a list. The record is left unchanged in that case.
pub fn apply_verification(
    fields: &mut Map<String, Value>,
    admin_id: &str,
    comment: &str,
) -> CoreResult<()> {
    let now = now_iso();
    let entry = json!({"adminId": admin_id, "comment": comment, "date": now});

    let comments = fields
        .entry("comments")
        .or_insert_with(|| Value::Array(Vec::new()));
    if comments.is_null() {
        *comments = Value::Array(Vec::new());
    }
    match comments {
        Value::Array(list) => list.push(entry),
        other => {
            return Err(CoreError::serialization(format!(
                "document comments must be a list, got {other}"
            )))
        }
    }

    fields.insert("status".into(), json!("verified"));
    fields.insert("verificationDate".into(), Value::String(now));
    fields.insert("verifiedBy".into(), Value::from(admin_id));
    Ok(())
}

/// Renders a stored document's `type` for messages; missing and null are empty.
pub(crate) fn type_label_of(record: &Value) -> String {
    match record.get("type") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// Per-student interface preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether notifications are shown.
    pub notifications: bool,
    /// Interface language.
    pub language: String,
    /// Interface theme.
    pub theme: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            notifications: true,
            language: "en".to_string(),
            theme: "light".to_string(),
        }
    }
}

/// Input for [`AdmissionDb::register_student`](crate::AdmissionDb::register_student).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    /// Login email; unique across students.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Any other caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A stored student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// Record id.
    pub id: RecordKey,
    /// Login email.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_text"
    )]
    pub email: Option<String>,
    /// Display name.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_text"
    )]
    pub name: Option<String>,
    /// Phone number.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_text"
    )]
    pub phone: Option<String>,
    /// Registration timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub registration_date: String,
    /// Generated college id.
    #[serde(default, deserialize_with = "lenient::text")]
    pub college_id: String,
    /// Account status.
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: String,
    /// Last login timestamp.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub last_login: Option<String>,
    /// Interface preferences.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub preferences: Preferences,
    /// Extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Student {
    const COLLECTION: &'static str = STUDENTS;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "email",
        "name",
        "phone",
        "registrationDate",
        "collegeId",
        "status",
        "lastLogin",
        "preferences",
    ];
}

impl Student {
    /// Builds an active student with default preferences.
    #[must_use]
    pub fn from_input(input: NewStudent) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            email: input.email,
            name: input.name,
            phone: input.phone,
            registration_date: now_iso(),
            college_id: generate_college_id(),
            status: STUDENT_ACTIVE.to_string(),
            last_login: None,
            preferences: Preferences::default(),
            extra: Self::spread(input.extra),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Input for [`AdmissionDb::create_notification`](crate::AdmissionDb::create_notification).
///
/// A supplied `date` is ignored; the creation time is always stamped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    /// Recipient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<RecordKey>,
    /// Notification type.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Message text.
    #[serde(default)]
    pub message: String,
    /// Initial read flag; defaults to unread.
    #[serde(default)]
    pub read: bool,
    /// Any other caller-supplied fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewNotification {
    /// Creates an unread notification for a student.
    pub fn new(
        student_id: Option<RecordKey>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            student_id,
            kind: kind.into(),
            message: message.into(),
            read: false,
            extra: Map::new(),
        }
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Record id.
    pub id: RecordKey,
    /// Recipient.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_key"
    )]
    pub student_id: Option<RecordKey>,
    /// Notification type.
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
    /// Message text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub message: String,
    /// Creation timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
    /// Whether the student has read it.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub read: bool,
    /// Extra fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record for Notification {
    const COLLECTION: &'static str = NOTIFICATIONS;
    const FIELDS: &'static [&'static str] = &["id", "studentId", "type", "message", "date", "read"];
}

impl Notification {
    /// Builds a notification stamped with the current time.
    #[must_use]
    pub fn from_input(input: NewNotification) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            student_id: input.student_id,
            kind: input.kind,
            message: input.message,
            date: now_iso(),
            read: input.read,
            extra: Self::spread(input.extra),
        }
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// Input for [`AdmissionDb::add_stream`](crate::AdmissionDb::add_stream).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStream {
    /// Stream name; unique.
    pub name: String,
    /// Optional short code.
    #[serde(default)]
    pub code: Option<String>,
}

/// A stored academic stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// Record id.
    pub id: RecordKey,
    /// Stream name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    /// Short code.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub code: Option<String>,
    /// Creation timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: String,
}

impl Record for Stream {
    const COLLECTION: &'static str = STREAMS;
    const FIELDS: &'static [&'static str] = &["id", "name", "code", "createdAt"];
}

impl Stream {
    /// Builds a stream. Only name and code are taken from the input.
    #[must_use]
    pub fn from_input(input: NewStream) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            name: input.name,
            code: input.code.filter(|code| !code.is_empty()),
            created_at: now_iso(),
        }
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// A stored analytics sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEntry {
    /// Record id.
    pub id: RecordKey,
    /// Metric name.
    #[serde(default, deserialize_with = "lenient::text")]
    pub metric: String,
    /// Opaque payload.
    #[serde(default)]
    pub data: Value,
    /// Sample timestamp.
    #[serde(default, deserialize_with = "lenient::text")]
    pub date: String,
}

impl Record for AnalyticsEntry {
    const COLLECTION: &'static str = ANALYTICS;
    const FIELDS: &'static [&'static str] = &["id", "metric", "data", "date"];
}

impl AnalyticsEntry {
    /// Builds a sample stamped with the current time.
    pub fn new(metric: impl Into<String>, data: Value) -> Self {
        Self {
            id: RecordKey::Text(generate_id()),
            metric: metric.into(),
            data,
            date: now_iso(),
        }
    }
}
