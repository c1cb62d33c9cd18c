//! Benchmark utilities.

use admitdb_admission::{AdmissionDb, NewApplication, NewStudent, RecordKey};
use rand::seq::SliceRandom;
use rand::Rng;

const STREAMS: [&str; 4] = ["Science", "Commerce", "Arts", "Vocational"];

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a random lowercase name.
pub fn random_name(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Open an in-memory store holding `count` students with one application each.
///
/// # Panics
///
/// Panics if the store cannot be opened or a record cannot be written.
pub fn populated_store(count: usize) -> (AdmissionDb, Vec<RecordKey>) {
    let store = AdmissionDb::in_memory();
    store.open().expect("open store");
    let mut rng = rand::thread_rng();

    let mut students = Vec::with_capacity(count);
    for i in 0..count {
        let name = random_name(8);
        let id = store
            .register_student(NewStudent {
                email: Some(format!("{name}{i}@example.com")),
                name: Some(name),
                ..NewStudent::default()
            })
            .payload
            .expect("register student")
            .id;
        let stream = STREAMS.choose(&mut rng).copied().unwrap_or("Science");
        let created = store.create_application(NewApplication {
            student_id: Some(id.clone()),
            stream: Some(stream.to_string()),
            ..NewApplication::default()
        });
        assert!(created.success, "create application");
        students.push(id);
    }
    (store, students)
}
