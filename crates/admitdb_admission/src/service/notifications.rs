use super::{decode_all, or_empty, AdmissionDb};
use crate::outcome::{CreatedRecord, Done, Outcome};
use crate::records::{student_of, NewNotification, Notification, Record};
use crate::schema::NOTIFICATIONS;
use admitdb_core::{CoreResult, RecordKey};
use serde_json::Value;

impl AdmissionDb {
    /// Stores a notification stamped with the current time.
    pub fn create_notification(&self, input: NewNotification) -> Outcome<CreatedRecord> {
        Outcome::from_result("create notification", self.try_create_notification(input))
    }

    fn try_create_notification(&self, input: NewNotification) -> CoreResult<CreatedRecord> {
        let notification = Notification::from_input(input);
        let id = self.db.add(NOTIFICATIONS, notification.to_record()?)?;
        self.refresh_badge(notification.student_id.as_ref());
        Ok(CreatedRecord { id })
    }

    /// Writes a side notification; failures are logged and swallowed.
    pub(crate) fn notify_best_effort(&self, input: NewNotification) {
        let kind = input.kind.clone();
        if let Err(err) = self.try_create_notification(input) {
            tracing::warn!(%kind, error = %err, "best-effort notification failed");
        }
    }

    /// Returns a student's unread notifications.
    #[must_use]
    pub fn get_unread_notifications(&self, student_id: &RecordKey) -> Vec<Notification> {
        let mut unread = or_empty(
            "get unread notifications",
            self.db
                .get_all_by_index(NOTIFICATIONS, "studentId", &student_id.to_value())
                .map(decode_all::<Notification>),
        );
        unread.retain(|n| !n.read);
        unread
    }

    /// Marks a notification read. An unknown id is a successful no-op.
    pub fn mark_notification_as_read(&self, id: &RecordKey) -> Outcome<Done> {
        Outcome::from_result("mark notification as read", self.try_mark_read(id))
    }

    fn try_mark_read(&self, id: &RecordKey) -> CoreResult<Done> {
        let updated = self.modify(NOTIFICATIONS, id, |fields| {
            fields.insert("read".into(), Value::Bool(true));
            Ok(())
        })?;
        if let Some(record) = updated {
            self.refresh_badge(student_of(&record).as_ref());
        }
        Ok(Done {})
    }
}

#[cfg(test)]
mod tests {
    use crate::records::NewNotification;
    use crate::{AdmissionDb, NotificationListener};
    use admitdb_core::RecordKey;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Badge(Mutex<Vec<(RecordKey, usize)>>);

    impl NotificationListener for Badge {
        fn unread_changed(&self, student_id: &RecordKey, unread: usize) {
            self.0.lock().push((student_id.clone(), unread));
        }
    }

    fn store() -> AdmissionDb {
        let store = AdmissionDb::in_memory();
        store.open().unwrap();
        store
    }

    #[test]
    fn unread_filters_read_and_other_students() {
        let store = store();
        let s1: RecordKey = "s1".into();
        let first = store
            .create_notification(NewNotification::new(Some(s1.clone()), "t", "one"))
            .payload
            .unwrap()
            .id;
        store.create_notification(NewNotification::new(Some(s1.clone()), "t", "two"));
        store.create_notification(NewNotification::new(Some("s2".into()), "t", "other"));

        assert_eq!(store.get_unread_notifications(&s1).len(), 2);
        store.mark_notification_as_read(&first);
        let unread = store.get_unread_notifications(&s1);
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "two");
    }

    #[test]
    fn supplied_read_flag_is_kept() {
        let store = store();
        let mut input = NewNotification::new(Some("s1".into()), "t", "m");
        input.read = true;
        store.create_notification(input);
        assert!(store.get_unread_notifications(&"s1".into()).is_empty());
    }

    #[test]
    fn listener_receives_unread_counts() {
        let store = store();
        let badge = Arc::new(Badge::default());
        store.set_notification_listener(Some(badge.clone()));

        let s1: RecordKey = "s1".into();
        let id = store
            .create_notification(NewNotification::new(Some(s1.clone()), "t", "m"))
            .payload
            .unwrap()
            .id;
        store.mark_notification_as_read(&id);

        assert_eq!(*badge.0.lock(), vec![(s1.clone(), 1), (s1, 0)]);
    }

    #[test]
    fn mark_missing_is_success() {
        let store = store();
        assert!(store.mark_notification_as_read(&"missing".into()).success);
    }
}
