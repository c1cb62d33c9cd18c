//! Uniform operation results.

use admitdb_core::{CoreError, CoreResult, ErrorKind, RecordKey};
use serde::Serialize;

/// Result of a domain operation.
///
/// Serializes as `{"success": true, ...payload}` or
/// `{"success": false, "error": "...", "kind": "..."}`. Domain operations
/// never return raw errors; every fault is folded into a failed outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Payload of a successful operation.
    #[serde(flatten)]
    pub payload: Option<T>,
    /// Error message of a failed operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error category of a failed operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T> Outcome<T> {
    /// Creates a successful outcome.
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
            kind: None,
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn fail(err: &CoreError) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }

    /// Folds a result, logging failures under `operation`.
    pub fn from_result(operation: &str, result: CoreResult<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => {
                tracing::error!(operation, error = %err, kind = %err.kind(), "operation failed");
                Self::fail(&err)
            }
        }
    }

    /// Returns true for a successful outcome.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }
}

impl Outcome<Done> {
    /// Creates a successful outcome with no payload.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            success: true,
            payload: Some(Done {}),
            error: None,
            kind: None,
        }
    }
}

/// Empty payload of operations that only report success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Done {}

/// Payload carrying the id of a created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRecord {
    /// Key of the new record.
    pub id: RecordKey,
}

/// Payload for records that also receive a college id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedWithCollegeId {
    /// Key of the new record.
    pub id: RecordKey,
    /// Generated college id.
    pub college_id: String,
}

/// Counters reported by a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Collections present in the snapshot.
    pub collections: usize,
    /// Records written.
    pub records: usize,
    /// Batches written.
    pub batches: usize,
    /// Pauses taken between batches.
    pub pauses: usize,
}

/// A serialized backup ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    /// Suggested file name.
    pub file_name: String,
    /// Size of `contents` in bytes.
    pub size: usize,
    /// Pretty-printed JSON.
    #[serde(skip)]
    pub contents: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_flattens_payload() {
        let outcome = Outcome::ok(CreatedWithCollegeId {
            id: RecordKey::Text("abc".into()),
            college_id: "IC20240001".into(),
        });
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "id": "abc", "collegeId": "IC20240001"})
        );
    }

    #[test]
    fn done_is_bare_success() {
        assert_eq!(
            serde_json::to_value(Outcome::done()).unwrap(),
            json!({"success": true})
        );
    }

    #[test]
    fn failure_carries_kind() {
        let outcome: Outcome<CreatedRecord> =
            Outcome::from_result("test", Err(CoreError::not_found("documents", "d1")));
        assert!(!outcome.is_success());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "success": false,
                "error": "record not found: d1 in documents",
                "kind": "not_found",
            })
        );
    }

    #[test]
    fn backup_contents_not_serialized() {
        let file = BackupFile {
            file_name: "college_backup_2024-01-01.json".into(),
            size: 2,
            contents: b"{}".to_vec(),
        };
        assert_eq!(
            serde_json::to_value(&file).unwrap(),
            json!({"fileName": "college_backup_2024-01-01.json", "size": 2})
        );
    }
}
