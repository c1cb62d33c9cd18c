//! At-rest record encoding.

use crate::error::{CoreError, CoreResult};
use serde_json::Value;

/// Encodes a record as CBOR.
pub(crate) fn encode_record(record: &Value) -> CoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| CoreError::serialization(format!("CBOR encode: {e}")))?;
    Ok(buf)
}

/// Decodes a CBOR record.
pub(crate) fn decode_record(bytes: &[u8]) -> CoreResult<Value> {
    ciborium::from_reader(bytes).map_err(|e| CoreError::serialization(format!("CBOR decode: {e}")))
}
