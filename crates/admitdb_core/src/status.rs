//! Process-wide database status.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Connection status of a [`Database`](crate::Database).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseStatus {
    /// Not yet opened, or closed.
    #[default]
    NotInitialized,
    /// Open and serving requests.
    Connected,
    /// The last open or import failed.
    Error,
    /// A snapshot import is in progress.
    Syncing,
}

impl DatabaseStatus {
    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Syncing => "syncing",
        }
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives status changes, e.g. to redraw a status indicator.
pub trait StatusListener: Send + Sync {
    /// Called after every status change.
    fn status_changed(&self, status: DatabaseStatus);
}

/// Current status plus the listener to notify.
#[derive(Default)]
pub(crate) struct StatusCell {
    current: RwLock<DatabaseStatus>,
    listener: RwLock<Option<Arc<dyn StatusListener>>>,
}

impl StatusCell {
    pub(crate) fn get(&self) -> DatabaseStatus {
        *self.current.read()
    }

    pub(crate) fn set(&self, status: DatabaseStatus) {
        *self.current.write() = status;
        tracing::debug!(%status, "database status changed");
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener.status_changed(status);
        }
    }

    pub(crate) fn set_listener(&self, listener: Option<Arc<dyn StatusListener>>) {
        *self.listener.write() = listener;
    }
}

impl fmt::Debug for StatusCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusCell")
            .field("current", &self.get())
            .field("listener", &self.listener.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<DatabaseStatus>>);

    impl StatusListener for Recorder {
        fn status_changed(&self, status: DatabaseStatus) {
            self.0.lock().push(status);
        }
    }

    #[test]
    fn listener_sees_every_change() {
        let recorder = Arc::new(Recorder::default());
        let cell = StatusCell::default();
        cell.set_listener(Some(recorder.clone()));

        cell.set(DatabaseStatus::Connected);
        cell.set(DatabaseStatus::Syncing);

        assert_eq!(cell.get(), DatabaseStatus::Syncing);
        assert_eq!(
            *recorder.0.lock(),
            vec![DatabaseStatus::Connected, DatabaseStatus::Syncing]
        );
    }

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_value(DatabaseStatus::NotInitialized).unwrap(),
            serde_json::json!("not_initialized")
        );
        assert_eq!(DatabaseStatus::Syncing.to_string(), "syncing");
    }
}
