use super::{decode_all, or_empty, AdmissionDb};
use crate::outcome::{CreatedWithCollegeId, Done, Outcome};
use crate::records::{
    Application, NewApplication, NewNotification, Record, APPLICATION_SUBMITTED,
};
use crate::schema::APPLICATIONS;
use admitdb_core::{CoreError, CoreResult, RecordKey};
use serde_json::Value;

const SUBMITTED_MESSAGE: &str = "Your application has been submitted successfully";

impl AdmissionDb {
    /// Creates a pending application and notifies the applicant.
    ///
    /// The notification is best-effort: if it cannot be written the
    /// application still counts as created.
    pub fn create_application(&self, input: NewApplication) -> Outcome<CreatedWithCollegeId> {
        Outcome::from_result("create application", self.try_create_application(input))
    }

    fn try_create_application(&self, input: NewApplication) -> CoreResult<CreatedWithCollegeId> {
        let application = Application::from_input(input);
        let id = self.db.add(APPLICATIONS, application.to_record()?)?;
        tracing::info!(%id, college_id = %application.college_id, "application created");

        self.notify_best_effort(NewNotification::new(
            application.student_id.clone(),
            APPLICATION_SUBMITTED,
            SUBMITTED_MESSAGE,
        ));

        Ok(CreatedWithCollegeId {
            id,
            college_id: application.college_id,
        })
    }

    /// Sets an application's status.
    pub fn update_application_status(&self, id: &RecordKey, status: &str) -> Outcome<Done> {
        Outcome::from_result(
            "update application status",
            self.try_update_application_status(id, status),
        )
    }

    fn try_update_application_status(&self, id: &RecordKey, status: &str) -> CoreResult<Done> {
        self.modify(APPLICATIONS, id, |fields| {
            fields.insert("status".into(), Value::from(status));
            Ok(())
        })?
        .ok_or_else(|| CoreError::not_found(APPLICATIONS, id))?;
        Ok(Done {})
    }

    /// Reads one application.
    #[must_use]
    pub fn get_application(&self, id: &RecordKey) -> Option<Application> {
        match self.db.get(APPLICATIONS, id) {
            Ok(record) => record.and_then(|r| decode_all(vec![r]).pop()),
            Err(err) => {
                tracing::error!(error = %err, "get application failed");
                None
            }
        }
    }

    /// Returns a student's applications.
    #[must_use]
    pub fn get_applications_for_student(&self, student_id: &RecordKey) -> Vec<Application> {
        or_empty(
            "get applications for student",
            self.db
                .get_all_by_index(APPLICATIONS, "studentId", &student_id.to_value())
                .map(decode_all),
        )
    }

    /// Returns applications with the given status.
    #[must_use]
    pub fn get_applications_by_status(&self, status: &str) -> Vec<Application> {
        or_empty(
            "get applications by status",
            self.db
                .get_all_by_index(APPLICATIONS, "status", &Value::from(status))
                .map(decode_all),
        )
    }
}
