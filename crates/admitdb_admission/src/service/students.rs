use super::{decode_all, AdmissionDb};
use crate::outcome::{CreatedWithCollegeId, Outcome};
use crate::records::{NewStudent, Record, Student};
use crate::schema::STUDENTS;
use admitdb_core::{CoreResult, RecordKey};
use serde_json::Value;

impl AdmissionDb {
    /// Registers a student. A duplicate email fails with `constraint_violation`.
    pub fn register_student(&self, input: NewStudent) -> Outcome<CreatedWithCollegeId> {
        Outcome::from_result("register student", self.try_register_student(input))
    }

    fn try_register_student(&self, input: NewStudent) -> CoreResult<CreatedWithCollegeId> {
        let student = Student::from_input(input);
        let id = self.db.add(STUDENTS, student.to_record()?)?;
        tracing::info!(%id, college_id = %student.college_id, "student registered");
        Ok(CreatedWithCollegeId {
            id,
            college_id: student.college_id,
        })
    }

    /// Reads one student.
    #[must_use]
    pub fn get_student(&self, id: &RecordKey) -> Option<Student> {
        match self.db.get(STUDENTS, id) {
            Ok(record) => record.and_then(|r| decode_all(vec![r]).pop()),
            Err(err) => {
                tracing::error!(error = %err, "get student failed");
                None
            }
        }
    }

    /// Finds a student by email through the unique index.
    #[must_use]
    pub fn find_student_by_email(&self, email: &str) -> Option<Student> {
        match self
            .db
            .get_all_by_index(STUDENTS, "email", &Value::from(email))
        {
            Ok(records) => decode_all::<Student>(records).pop(),
            Err(err) => {
                tracing::error!(error = %err, "find student failed");
                None
            }
        }
    }
}
