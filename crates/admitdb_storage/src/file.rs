//! File-based storage engine for persistent storage.
//!
//! ## Directory Layout
//!
//! ```text
//! mydb/
//! ├─ LOCK              # Advisory lock for single-process access
//! └─ journal.log       # Append-only journal of mutations
//! ```

use crate::engine::StorageEngine;
use crate::error::{StorageError, StorageResult};
use crate::journal::{Decoded, JournalEntry};
use crate::state::EngineState;
use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Lock file name.
const LOCK_FILE: &str = "LOCK";

/// Journal file name.
const JOURNAL_FILE: &str = "journal.log";

/// Temporary journal file used during compaction.
const JOURNAL_TEMP: &str = "journal.log.tmp";

/// Configuration for a [`FileEngine`].
#[derive(Debug, Clone)]
pub struct FileEngineConfig {
    /// Create the directory if it does not exist.
    pub create_if_missing: bool,
    /// Call `sync_data` after every journal append.
    pub sync_on_write: bool,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
        }
    }
}

impl FileEngineConfig {
    /// Sets whether to create the directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets whether to sync after every write.
    #[must_use]
    pub const fn sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }
}

/// A journal-backed persistent storage engine.
///
/// All stores live in memory and every mutation is appended to
/// `journal.log` before it becomes visible. Opening the engine replays
/// the journal. A partly written frame at the end of the journal (for
/// example after a crash mid-append) is discarded and truncated away;
/// damage before the last frame fails the open and leaves the file as is.
///
/// The directory is protected by an exclusive advisory lock, so a second
/// engine on the same path fails with [`StorageError::Locked`] until the
/// first one is dropped.
///
/// # Example
///
/// ```no_run
/// use admitdb_storage::{FileEngine, FileEngineConfig, StorageEngine};
/// use std::path::Path;
///
/// let engine = FileEngine::open(Path::new("admissions"), FileEngineConfig::default()).unwrap();
/// engine.create_store("students").unwrap();
/// engine.put("students", b"k", b"v").unwrap();
/// ```
#[derive(Debug)]
pub struct FileEngine {
    path: PathBuf,
    config: FileEngineConfig,
    state: RwLock<EngineState>,
    journal: Mutex<File>,
    _lock_file: File,
}

impl FileEngine {
    /// Opens a file engine at the given directory.
    ///
    /// # Errors
    ///
    /// - The directory is missing and `create_if_missing` is false
    /// - Another process holds the lock
    /// - The journal is corrupted anywhere but in its final frame
    pub fn open(path: &Path, config: FileEngineConfig) -> StorageResult<Self> {
        if !path.exists() {
            if config.create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("database directory does not exist: {}", path.display()),
                )));
            }
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let journal_path = path.join(JOURNAL_FILE);
        let mut journal = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&journal_path)?;

        let mut data = Vec::new();
        journal.read_to_end(&mut data)?;
        let (state, valid_len) = replay(&data)?;

        if valid_len < data.len() {
            tracing::warn!(
                path = %journal_path.display(),
                discarded = data.len() - valid_len,
                "truncating torn journal tail"
            );
            journal.set_len(valid_len as u64)?;
            journal.sync_all()?;
        }

        tracing::debug!(
            path = %path.display(),
            version = state.version,
            stores = state.stores.len(),
            "opened file engine"
        );

        Ok(Self {
            path: path.to_path_buf(),
            config,
            state: RwLock::new(state),
            journal: Mutex::new(journal),
            _lock_file: lock_file,
        })
    }

    /// Returns the database directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current journal size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if file metadata cannot be read.
    pub fn journal_size(&self) -> StorageResult<u64> {
        Ok(self.journal.lock().metadata()?.len())
    }

    /// Rewrites the journal so it holds exactly one entry per live key.
    ///
    /// The new journal is written to a temporary file, synced, then renamed
    /// over the old one.
    ///
    /// # Errors
    ///
    /// Returns an error if the new journal cannot be written or renamed.
    pub fn compact(&self) -> StorageResult<()> {
        let state = self.state.write();
        let mut journal = self.journal.lock();

        let before = journal.metadata()?.len();
        let temp_path = self.path.join(JOURNAL_TEMP);
        let mut temp = File::create(&temp_path)?;
        for entry in state.to_entries() {
            temp.write_all(&entry.encode()?)?;
        }
        temp.sync_all()?;
        drop(temp);

        fs::rename(&temp_path, self.path.join(JOURNAL_FILE))?;
        self.sync_directory()?;

        *journal = OpenOptions::new()
            .read(true)
            .append(true)
            .open(self.path.join(JOURNAL_FILE))?;
        let after = journal.metadata()?.len();

        tracing::info!(before, after, "compacted journal");
        Ok(())
    }

    /// Appends an entry and applies it to the live state.
    fn commit(&self, entry: JournalEntry) -> StorageResult<()> {
        let mut state = self.state.write();
        if let JournalEntry::Put { store, .. } | JournalEntry::Delete { store, .. } = &entry {
            if !state.has_store(store) {
                return Err(StorageError::store_not_found(store.as_str()));
            }
        }

        let frame = entry.encode()?;
        append_frame(&mut *self.journal.lock(), &frame, self.config.sync_on_write)?;
        state.apply(&entry)
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        File::open(&self.path)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// The file operations a journal append needs.
trait JournalFile: Write {
    fn current_len(&self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&self) -> io::Result<()>;
}

impl JournalFile for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends one frame, cutting the journal back to its previous length if
/// the write or sync fails so no partial frame is left behind.
fn append_frame<F: JournalFile>(file: &mut F, frame: &[u8], sync: bool) -> StorageResult<()> {
    let before = file.current_len()?;
    let written = file
        .write_all(frame)
        .and_then(|()| if sync { file.sync() } else { Ok(()) });
    if let Err(err) = written {
        if let Err(rollback) = file.truncate_to(before) {
            tracing::error!(error = %rollback, len = before, "failed to roll back journal append");
        }
        return Err(err.into());
    }
    Ok(())
}

/// Replays journal bytes, returning the state and the length of the valid prefix.
fn replay(data: &[u8]) -> StorageResult<(EngineState, usize)> {
    let mut state = EngineState::default();
    let mut offset = 0;
    while offset < data.len() {
        let decoded = JournalEntry::decode(&data[offset..]).map_err(|e| match e {
            StorageError::Corrupted(msg) => {
                StorageError::Corrupted(format!("journal at offset {offset}: {msg}"))
            }
            other => other,
        })?;
        match decoded {
            Decoded::Entry(entry, used) => {
                state.apply(&entry).map_err(|e| {
                    StorageError::Corrupted(format!("journal replay at offset {offset}: {e}"))
                })?;
                offset += used;
            }
            Decoded::Torn => break,
        }
    }
    Ok((state, offset))
}

impl StorageEngine for FileEngine {
    fn version(&self) -> StorageResult<u32> {
        Ok(self.state.read().version)
    }

    fn set_version(&self, version: u32) -> StorageResult<()> {
        self.commit(JournalEntry::Version(version))
    }

    fn store_names(&self) -> StorageResult<Vec<String>> {
        Ok(self.state.read().stores.keys().cloned().collect())
    }

    fn create_store(&self, name: &str) -> StorageResult<()> {
        if self.state.read().has_store(name) {
            return Ok(());
        }
        self.commit(JournalEntry::CreateStore {
            name: name.to_string(),
        })
    }

    fn get(&self, store: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.state.read().store(store)?.get(key).cloned())
    }

    fn put(&self, store: &str, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.commit(JournalEntry::Put {
            store: store.to_string(),
            key: key.to_vec(),
            value: value.to_vec(),
        })
    }

    fn delete(&self, store: &str, key: &[u8]) -> StorageResult<()> {
        self.commit(JournalEntry::Delete {
            store: store.to_string(),
            key: key.to_vec(),
        })
    }

    fn scan(&self, store: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self
            .state
            .read()
            .store(store)?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn flush(&self) -> StorageResult<()> {
        let mut journal = self.journal.lock();
        journal.flush()?;
        journal.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open(path: &Path) -> FileEngine {
        FileEngine::open(path, FileEngineConfig::default()).unwrap()
    }

    #[test]
    fn open_creates_directory() {
        let temp = tempdir().unwrap();
        let db_path = temp.path().join("new_db");
        let engine = open(&db_path);
        assert!(db_path.join(LOCK_FILE).exists());
        assert!(db_path.join(JOURNAL_FILE).exists());
        assert_eq!(engine.path(), db_path);
    }

    #[test]
    fn open_fails_if_missing_and_no_create() {
        let temp = tempdir().unwrap();
        let result = FileEngine::open(
            &temp.path().join("missing"),
            FileEngineConfig::default().create_if_missing(false),
        );
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let _first = open(temp.path());
        assert!(matches!(
            FileEngine::open(temp.path(), FileEngineConfig::default()),
            Err(StorageError::Locked)
        ));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        drop(open(temp.path()));
        let _again = open(temp.path());
    }

    #[test]
    fn data_survives_reopen() {
        let temp = tempdir().unwrap();
        {
            let engine = open(temp.path());
            engine.set_version(2).unwrap();
            engine.create_store("students").unwrap();
            engine.put("students", b"a", b"1").unwrap();
            engine.put("students", b"b", b"2").unwrap();
            engine.delete("students", b"a").unwrap();
        }

        let engine = open(temp.path());
        assert_eq!(engine.version().unwrap(), 2);
        assert_eq!(engine.store_names().unwrap(), vec!["students"]);
        assert_eq!(engine.get("students", b"a").unwrap(), None);
        assert_eq!(engine.get("students", b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn torn_tail_is_truncated() {
        let temp = tempdir().unwrap();
        {
            let engine = open(temp.path());
            engine.create_store("s").unwrap();
            engine.put("s", b"k", b"v").unwrap();
        }

        let journal_path = temp.path().join(JOURNAL_FILE);
        let valid_len = fs::metadata(&journal_path).unwrap().len();
        {
            let mut file = OpenOptions::new().append(true).open(&journal_path).unwrap();
            file.write_all(b"AJNL\x03\xff\xff").unwrap();
        }

        let engine = open(temp.path());
        assert_eq!(engine.get("s", b"k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(engine.journal_size().unwrap(), valid_len);
    }

    #[test]
    fn damaged_middle_frame_fails_open_without_truncating() {
        let temp = tempdir().unwrap();
        {
            let engine = open(temp.path());
            engine.create_store("s").unwrap();
            engine.put("s", b"a", b"1").unwrap();
            engine.put("s", b"b", b"2").unwrap();
            engine.put("s", b"c", b"3").unwrap();
        }

        let journal_path = temp.path().join(JOURNAL_FILE);
        let mut data = fs::read(&journal_path).unwrap();
        let len = data.len();
        let create_len = JournalEntry::CreateStore { name: "s".into() }
            .encode()
            .unwrap()
            .len();
        data[create_len + 12] ^= 0xFF;
        fs::write(&journal_path, &data).unwrap();

        assert!(matches!(
            FileEngine::open(temp.path(), FileEngineConfig::default()),
            Err(StorageError::Corrupted(_))
        ));
        assert_eq!(fs::metadata(&journal_path).unwrap().len(), len as u64);
    }

    /// Accepts `accept` more bytes, then fails every write.
    struct FailingFile {
        data: Vec<u8>,
        accept: usize,
    }

    impl Write for FailingFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accept == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.accept);
            self.data.extend_from_slice(&buf[..n]);
            self.accept -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl JournalFile for FailingFile {
        fn current_len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failed_append_rolls_back_partial_frame() {
        let create = JournalEntry::CreateStore { name: "s".into() };
        let mut file = FailingFile {
            data: create.encode().unwrap(),
            accept: 5,
        };
        let clean = file.data.clone();

        let put = JournalEntry::Put {
            store: "s".into(),
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        };
        assert!(matches!(
            append_frame(&mut file, &put.encode().unwrap(), true),
            Err(StorageError::Io(_))
        ));
        assert_eq!(file.data, clean);

        file.accept = usize::MAX;
        append_frame(&mut file, &put.encode().unwrap(), true).unwrap();
        let (state, valid_len) = replay(&file.data).unwrap();
        assert_eq!(valid_len, file.data.len());
        assert_eq!(state.store("s").unwrap().get(&b"k"[..]), Some(&b"v".to_vec()));
    }

    #[test]
    fn put_to_missing_store_leaves_journal_untouched() {
        let temp = tempdir().unwrap();
        let engine = open(temp.path());
        let before = engine.journal_size().unwrap();
        assert!(matches!(
            engine.put("nope", b"k", b"v"),
            Err(StorageError::StoreNotFound { .. })
        ));
        assert_eq!(engine.journal_size().unwrap(), before);
    }

    #[test]
    fn compact_shrinks_and_preserves() {
        let temp = tempdir().unwrap();
        {
            let engine = open(temp.path());
            engine.create_store("s").unwrap();
            for i in 0..50u8 {
                engine.put("s", b"hot", &[i]).unwrap();
            }
            engine.put("s", b"cold", b"x").unwrap();

            let before = engine.journal_size().unwrap();
            engine.compact().unwrap();
            assert!(engine.journal_size().unwrap() < before);

            engine.put("s", b"after", b"y").unwrap();
        }

        let engine = open(temp.path());
        assert_eq!(engine.get("s", b"hot").unwrap(), Some(vec![49]));
        assert_eq!(engine.get("s", b"cold").unwrap(), Some(b"x".to_vec()));
        assert_eq!(engine.get("s", b"after").unwrap(), Some(b"y".to_vec()));
        assert!(!temp.path().join(JOURNAL_TEMP).exists());
    }
}
