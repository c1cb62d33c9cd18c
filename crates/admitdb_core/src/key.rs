//! Record keys.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const TAG_INT: u8 = 0x01;
const TAG_TEXT: u8 = 0x02;

/// Primary key of a record, stored in its `id` field.
///
/// Keys are either integers (assigned by auto-increment or supplied) or
/// strings (generated identifiers). In storage they are encoded so that
/// byte order matches key order: all integers sort before all strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    /// Integer key.
    Int(i64),
    /// String key.
    Text(String),
}

impl RecordKey {
    /// Extracts a key from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns a serialization error unless the value is a string or an
    /// integer representable as `i64`.
    pub fn from_value(value: &Value) -> CoreResult<Self> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .ok_or_else(|| CoreError::serialization(format!("record id {n} is not an integer"))),
            other => Err(CoreError::serialization(format!(
                "record id must be a string or integer, got {other}"
            ))),
        }
    }

    /// Converts the key to its JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Text(s) => Value::String(s.clone()),
        }
    }

    /// Parses user input: integers become [`RecordKey::Int`], anything else text.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        input
            .parse::<i64>()
            .map_or_else(|_| Self::Text(input.to_string()), Self::Int)
    }

    /// Returns the integer value, if this is an integer key.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(_) => None,
        }
    }

    /// Encodes the key into order-preserving bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Int(i) => {
                let mut buf = Vec::with_capacity(9);
                buf.push(TAG_INT);
                buf.extend_from_slice(&((*i as u64) ^ (1 << 63)).to_be_bytes());
                buf
            }
            Self::Text(s) => {
                let mut buf = Vec::with_capacity(1 + s.len());
                buf.push(TAG_TEXT);
                buf.extend_from_slice(s.as_bytes());
                buf
            }
        }
    }

    /// Decodes a key produced by [`RecordKey::encode`].
    ///
    /// # Errors
    ///
    /// Returns a serialization error for malformed bytes.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        match bytes.split_first() {
            Some((&TAG_INT, rest)) => {
                let arr: [u8; 8] = rest
                    .try_into()
                    .map_err(|_| CoreError::serialization("expected 8 bytes for integer key"))?;
                Ok(Self::Int((u64::from_be_bytes(arr) ^ (1 << 63)) as i64))
            }
            Some((&TAG_TEXT, rest)) => String::from_utf8(rest.to_vec())
                .map(Self::Text)
                .map_err(|_| CoreError::serialization("invalid UTF-8 in key")),
            _ => Err(CoreError::serialization("unknown key tag")),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for RecordKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
