//! Journal entry framing.
//!
//! Every mutation of a [`FileEngine`](crate::FileEngine) is appended to
//! `journal.log` as one self-checking frame:
//!
//! ```text
//! | magic "AJNL" (4) | type (1) | payload_len (4, LE) | payload | crc32 (4, LE) |
//! ```
//!
//! The CRC covers `type | payload_len | payload`. A frame cut short at the
//! end of the journal marks the end of the valid journal, as does a final
//! frame whose checksum fails. A bad frame with more bytes after it is
//! corruption.

use crate::error::{StorageError, StorageResult};

/// Magic bytes at the start of each journal frame.
pub(crate) const JOURNAL_MAGIC: [u8; 4] = *b"AJNL";

/// Bytes preceding the payload: magic, type and length.
const HEADER_SIZE: usize = 4 + 1 + 4;

/// Bytes following the payload.
const TRAILER_SIZE: usize = 4;

/// Journal entry type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum EntryType {
    Version = 1,
    CreateStore = 2,
    Put = 3,
    Delete = 4,
}

impl EntryType {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(Self::Version),
            2 => Some(Self::CreateStore),
            3 => Some(Self::Put),
            4 => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A single mutation recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JournalEntry {
    /// Schema version change.
    Version(u32),
    /// Store creation.
    CreateStore { name: String },
    /// Value written under a key.
    Put {
        store: String,
        key: Vec<u8>,
        value: Vec<u8>,
    },
    /// Key removed.
    Delete { store: String, key: Vec<u8> },
}

/// Result of decoding the frame at a given offset.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// A complete, checksummed entry and the number of bytes it used.
    Entry(JournalEntry, usize),
    /// A partly written final frame; everything from here is discarded.
    Torn,
}

impl JournalEntry {
    fn entry_type(&self) -> EntryType {
        match self {
            Self::Version(_) => EntryType::Version,
            Self::CreateStore { .. } => EntryType::CreateStore,
            Self::Put { .. } => EntryType::Put,
            Self::Delete { .. } => EntryType::Delete,
        }
    }

    fn encode_payload(&self) -> StorageResult<Vec<u8>> {
        let mut buf = Vec::new();
        match self {
            Self::Version(version) => buf.extend_from_slice(&version.to_le_bytes()),
            Self::CreateStore { name } => put_bytes(&mut buf, name.as_bytes())?,
            Self::Put { store, key, value } => {
                put_bytes(&mut buf, store.as_bytes())?;
                put_bytes(&mut buf, key)?;
                put_bytes(&mut buf, value)?;
            }
            Self::Delete { store, key } => {
                put_bytes(&mut buf, store.as_bytes())?;
                put_bytes(&mut buf, key)?;
            }
        }
        Ok(buf)
    }

    fn decode_payload(entry_type: EntryType, payload: &[u8]) -> StorageResult<Self> {
        let mut cursor = Cursor::new(payload);
        let entry = match entry_type {
            EntryType::Version => Self::Version(cursor.read_u32()?),
            EntryType::CreateStore => Self::CreateStore {
                name: cursor.read_string()?,
            },
            EntryType::Put => Self::Put {
                store: cursor.read_string()?,
                key: cursor.read_bytes()?,
                value: cursor.read_bytes()?,
            },
            EntryType::Delete => Self::Delete {
                store: cursor.read_string()?,
                key: cursor.read_bytes()?,
            },
        };
        if !cursor.is_empty() {
            return Err(StorageError::Corrupted(
                "trailing bytes in journal payload".into(),
            ));
        }
        Ok(entry)
    }

    /// Encodes this entry as a complete frame.
    pub(crate) fn encode(&self) -> StorageResult<Vec<u8>> {
        let payload = self.encode_payload()?;
        let len = u32::try_from(payload.len())
            .map_err(|_| StorageError::Corrupted("journal payload too large".into()))?;

        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len() + TRAILER_SIZE);
        frame.extend_from_slice(&JOURNAL_MAGIC);
        frame.push(self.entry_type() as u8);
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&payload);
        let crc = compute_crc32(&frame[JOURNAL_MAGIC.len()..]);
        frame.extend_from_slice(&crc.to_le_bytes());
        Ok(frame)
    }

    /// Decodes the frame at the start of `data`.
    ///
    /// Returns [`Decoded::Torn`] for a frame that was only partly written,
    /// that is one running past the end of `data` or a checksum failure on
    /// the last frame. Bad magic, a checksum failure followed by more bytes,
    /// or a checksummed frame with malformed contents is a corruption error.
    pub(crate) fn decode(data: &[u8]) -> StorageResult<Decoded> {
        if data.len() < HEADER_SIZE {
            return Ok(Decoded::Torn);
        }
        if data[..4] != JOURNAL_MAGIC {
            return Err(StorageError::Corrupted(
                "invalid journal frame magic".into(),
            ));
        }
        let len = u32::from_le_bytes([data[5], data[6], data[7], data[8]]) as usize;
        let total = HEADER_SIZE
            .checked_add(len)
            .and_then(|n| n.checked_add(TRAILER_SIZE))
            .ok_or_else(|| StorageError::Corrupted("journal frame length overflow".into()))?;
        if data.len() < total {
            return Ok(Decoded::Torn);
        }

        let body_end = HEADER_SIZE + len;
        let stored = u32::from_le_bytes([
            data[body_end],
            data[body_end + 1],
            data[body_end + 2],
            data[body_end + 3],
        ]);
        let computed = compute_crc32(&data[4..body_end]);
        if computed != stored {
            if data.len() == total {
                return Ok(Decoded::Torn);
            }
            return Err(StorageError::Corrupted(format!(
                "journal checksum mismatch: expected {stored:#010x}, got {computed:#010x}"
            )));
        }

        let entry_type = EntryType::from_byte(data[4]).ok_or_else(|| {
            StorageError::Corrupted(format!("unknown journal entry type: {}", data[4]))
        })?;
        let entry = Self::decode_payload(entry_type, &data[HEADER_SIZE..body_end])?;
        Ok(Decoded::Entry(entry, total))
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> StorageResult<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| StorageError::Corrupted("journal field too large".into()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    fn take(&mut self, n: usize) -> StorageResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| StorageError::Corrupted("journal payload truncated".into()))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u32(&mut self) -> StorageResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_bytes(&mut self) -> StorageResult<Vec<u8>> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    fn read_string(&mut self) -> StorageResult<String> {
        String::from_utf8(self.read_bytes()?)
            .map_err(|e| StorageError::Corrupted(format!("invalid store name: {e}")))
    }
}

/// Computes a CRC32 (IEEE) checksum.
pub(crate) fn compute_crc32(data: &[u8]) -> u32 {
    const CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            let mut crc = i as u32;
            let mut j = 0;
            while j < 8 {
                if crc & 1 != 0 {
                    crc = (crc >> 1) ^ 0xEDB8_8320;
                } else {
                    crc >>= 1;
                }
                j += 1;
            }
            table[i] = crc;
            i += 1;
        }
        table
    };

    let mut crc = 0xFFFF_FFFF_u32;
    for &byte in data {
        let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    !crc
}
