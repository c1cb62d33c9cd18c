use super::{decode_all, or_empty, AdmissionDb};
use crate::outcome::{CreatedRecord, Done, Outcome};
use crate::records::{
    apply_verification, student_of, type_label_of, Document, NewDocument, NewNotification, Record,
    DOCUMENT_UPLOADED, DOCUMENT_VERIFIED,
};
use crate::schema::DOCUMENTS;
use admitdb_core::{CoreError, CoreResult, RecordKey};

impl AdmissionDb {
    /// Stores an uploaded document and notifies its student.
    pub fn upload_document(&self, input: NewDocument) -> Outcome<CreatedRecord> {
        Outcome::from_result("upload document", self.try_upload_document(input))
    }

    fn try_upload_document(&self, input: NewDocument) -> CoreResult<CreatedRecord> {
        let document = Document::from_input(input);
        let id = self.db.add(DOCUMENTS, document.to_record()?)?;
        tracing::info!(%id, doc_type = document.type_label(), "document uploaded");

        self.notify_best_effort(NewNotification::new(
            document.student_id.clone(),
            DOCUMENT_UPLOADED,
            format!("Document {} uploaded successfully", document.type_label()),
        ));
        Ok(CreatedRecord { id })
    }

    /// Marks a document verified by `admin_id`, appending `comment`.
    ///
    /// Fails with `not_found` if the document does not exist, in which case
    /// no notification is written.
    pub fn verify_document(&self, id: &RecordKey, admin_id: &str, comment: &str) -> Outcome<Done> {
        Outcome::from_result(
            "verify document",
            self.try_verify_document(id, admin_id, comment),
        )
    }

    fn try_verify_document(&self, id: &RecordKey, admin_id: &str, comment: &str) -> CoreResult<Done> {
        let document = self
            .modify(DOCUMENTS, id, |fields| {
                apply_verification(fields, admin_id, comment)
            })?
            .ok_or_else(|| CoreError::not_found(DOCUMENTS, id))?;
        tracing::info!(%id, admin_id, "document verified");

        self.notify_best_effort(NewNotification::new(
            student_of(&document),
            DOCUMENT_VERIFIED,
            format!("Document {} has been verified", type_label_of(&document)),
        ));
        Ok(Done {})
    }

    /// Reads one document.
    #[must_use]
    pub fn get_document(&self, id: &RecordKey) -> Option<Document> {
        match self.db.get(DOCUMENTS, id) {
            Ok(record) => record.and_then(|r| decode_all(vec![r]).pop()),
            Err(err) => {
                tracing::error!(error = %err, "get document failed");
                None
            }
        }
    }

    /// Returns the documents attached to an application.
    #[must_use]
    pub fn get_documents_for_application(&self, application_id: &RecordKey) -> Vec<Document> {
        or_empty(
            "get documents for application",
            self.db
                .get_all_by_index(DOCUMENTS, "applicationId", &application_id.to_value())
                .map(decode_all::<Document>),
        )
    }
}
