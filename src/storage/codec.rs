//! Mapping codec
//!
//! JSON serialization plus zstd framing for the backing file.

use std::io::Write;

use serde_json::Value;

use crate::buffer::Mapping;
use crate::error::Result;
use crate::StashError;

/// Serialize a mapping to compact JSON and compress it
pub fn encode_mapping(mapping: &Mapping, level: i32) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(mapping)?;

    let mut encoder = zstd::Encoder::new(Vec::with_capacity(json.len() / 2), level)
        .map_err(|e| StashError::Compression(e.to_string()))?;
    encoder
        .include_checksum(true)
        .map_err(|e| StashError::Compression(e.to_string()))?;
    encoder
        .write_all(&json)
        .map_err(|e| StashError::Compression(e.to_string()))?;

    encoder
        .finish()
        .map_err(|e| StashError::Compression(e.to_string()))
}

/// Decompress and parse a backing file's bytes
///
/// The payload must be a JSON object; anything else is a corrupt store.
pub fn decode_mapping(bytes: &[u8]) -> Result<Mapping> {
    let json = zstd::decode_all(bytes).map_err(|e| StashError::Decompression(e.to_string()))?;

    match serde_json::from_slice::<Value>(&json)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(StashError::CorruptStore(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
