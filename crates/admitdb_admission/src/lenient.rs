//! Forgiving field decoders for the typed views of stored records.
//!
//! Stored records can come from imports and hold nulls or values of an
//! unexpected type. A typed view still decodes them: scalars are rendered
//! as text, unknown shapes fall back to the field's default.

use admitdb_core::RecordKey;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn render(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Any value as text; null becomes empty.
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(render(Value::deserialize(d)?).unwrap_or_default())
}

/// Any value as text; null becomes `None`.
pub(crate) fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(render(Value::deserialize(d)?))
}

/// Truthiness: null, `false`, `0` and `""` are false.
pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// A record reference; anything that is not a valid key becomes `None`.
pub(crate) fn opt_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RecordKey>, D::Error> {
    Ok(RecordKey::from_value(&Value::deserialize(d)?).ok())
}

/// The typed value, or its default when the stored value does not fit.
pub(crate) fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(d)?).unwrap_or_default())
}

/// The list elements that fit the typed view; a non-list is empty.
pub(crate) fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
