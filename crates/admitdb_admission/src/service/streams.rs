use super::{decode_all, or_empty, AdmissionDb};
use crate::outcome::{CreatedRecord, Done, Outcome};
use crate::records::{NewStream, Record, Stream};
use crate::schema::STREAMS;
use admitdb_core::{CoreResult, RecordKey};

impl AdmissionDb {
    /// Adds an academic stream. Stream names are unique.
    pub fn add_stream(&self, input: NewStream) -> Outcome<CreatedRecord> {
        Outcome::from_result("add stream", self.try_add_stream(input))
    }

    fn try_add_stream(&self, input: NewStream) -> CoreResult<CreatedRecord> {
        let stream = Stream::from_input(input);
        let id = self.db.add(STREAMS, stream.to_record()?)?;
        tracing::info!(%id, name = %stream.name, "stream added");
        Ok(CreatedRecord { id })
    }

    /// Returns every stream.
    #[must_use]
    pub fn get_all_streams(&self) -> Vec<Stream> {
        or_empty(
            "get all streams",
            self.db.get_all(STREAMS).map(decode_all::<Stream>),
        )
    }

    /// Deletes a stream. An unknown id is not an error.
    pub fn delete_stream(&self, id: &RecordKey) -> Outcome<Done> {
        Outcome::from_result(
            "delete stream",
            self.db.delete(STREAMS, id).map(|()| Done {}),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::records::NewStream;
    use crate::AdmissionDb;
    use admitdb_core::ErrorKind;

    fn stream(name: &str) -> NewStream {
        NewStream {
            name: name.into(),
            code: None,
        }
    }

    #[test]
    fn add_list_delete() {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();

        let science = store.add_stream(stream("Science")).payload.unwrap().id;
        store.add_stream(NewStream {
            name: "Commerce".into(),
            code: Some("COM".into()),
        });
        assert_eq!(store.get_all_streams().len(), 2);

        assert!(store.delete_stream(&science).success);
        assert!(store.delete_stream(&science).success);
        let remaining = store.get_all_streams();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code.as_deref(), Some("COM"));
    }

    #[test]
    fn duplicate_name_rejected() {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();
        store.add_stream(stream("Arts"));
        let outcome = store.add_stream(stream("Arts"));
        assert_eq!(outcome.kind, Some(ErrorKind::ConstraintViolation));
    }

    #[test]
    fn query_before_open_is_empty() {
        let store = AdmissionDb::in_memory();
        assert!(store.get_all_streams().is_empty());
    }
}
