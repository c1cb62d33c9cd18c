use super::{decode_all, or_empty, AdmissionDb};
use crate::records::Application;
use crate::schema::{APPLICATIONS, STUDENTS};
use admitdb_core::{CoreResult, KEY_FIELD};
use serde_json::Value;

impl AdmissionDb {
    /// Returns applications whose student name or email, stream, or college
    /// id contains `query`, case-insensitively.
    ///
    /// The searched text is `"<name> <email> <stream> <collegeId>"`. A
    /// missing or null field renders as an empty string rather than as a
    /// placeholder word, so a query like `undefined` never matches it.
    ///
    /// Loads both collections and joins them with a linear scan, so cost is
    /// O(applications x students). Applications whose student record is
    /// missing are skipped.
    #[must_use]
    pub fn search_applications(&self, query: &str) -> Vec<Application> {
        or_empty("search applications", self.try_search(query))
    }

    fn try_search(&self, query: &str) -> CoreResult<Vec<Application>> {
        let needle = query.to_lowercase();
        let applications = self.db.get_all(APPLICATIONS)?;
        let students = self.db.get_all(STUDENTS)?;

        let matches = applications
            .into_iter()
            .filter(|application| {
                let Some(student_id) = application.get("studentId").filter(|v| !v.is_null()) else {
                    return false;
                };
                let Some(student) = students
                    .iter()
                    .find(|s| s.get(KEY_FIELD) == Some(student_id))
                else {
                    return false;
                };
                let haystack = format!(
                    "{} {} {} {}",
                    text(student, "name"),
                    text(student, "email"),
                    text(application, "stream"),
                    text(application, "collegeId"),
                )
                .to_lowercase();
                haystack.contains(&needle)
            })
            .collect();
        Ok(decode_all(matches))
    }
}

/// Renders a field for searching; missing and null fields are empty.
fn text(record: &Value, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::records::{NewApplication, NewStudent};
    use crate::AdmissionDb;
    use admitdb_core::RecordKey;

    fn register(store: &AdmissionDb, name: &str, email: &str) -> RecordKey {
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

    fn apply(store: &AdmissionDb, student_id: RecordKey, stream: &str) -> RecordKey {
        store
            .create_application(NewApplication {
                student_id: Some(student_id),
                stream: Some(stream.into()),
                ..NewApplication::default()
            })
            .payload
            .unwrap()
            .id
    }

    #[test]
    fn joins_case_insensitively_and_skips_orphans() {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();

        let alice = register(&store, "Alice Smith", "asmith@example.com");
        let bob = register(&store, "Bob", "bob@example.com");
        let by_name = apply(&store, alice, "Science");
        let by_stream = apply(&store, bob, "Alice Studies");
        apply(&store, "ghost".into(), "alice");

        let mut found: Vec<_> = store
            .search_applications("ALICE")
            .into_iter()
            .map(|a| a.id)
            .collect();
        found.sort();
        let mut expected = vec![by_name, by_stream];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn missing_name_renders_empty() {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();
        let id = store
            .register_student(NewStudent {
                email: Some("noname@example.com".into()),
                ..NewStudent::default()
            })
            .payload
            .unwrap()
            .id;
        apply(&store, id, "Arts");

        assert!(store.search_applications("undefined").is_empty());
        assert!(store.search_applications("null").is_empty());
        assert_eq!(store.search_applications("noname@").len(), 1);
    }

    #[test]
    fn matches_email_and_college_id() {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();
        let carol = register(&store, "Carol", "carol@uni.edu");
        let created = store
            .create_application(NewApplication {
                student_id: Some(carol),
                ..NewApplication::default()
            })
            .payload
            .unwrap();

        assert_eq!(store.search_applications("UNI.EDU").len(), 1);
        assert_eq!(store.search_applications(&created.college_id).len(), 1);
        assert!(store.search_applications("zzz").is_empty());
    }
}
