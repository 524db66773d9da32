//! Canonical payload encoding.
//!
//! Payloads are compact JSON: no insignificant whitespace, no HTML
//! escaping of `<`, `>` or `&` (queries are full of comparison operators).
//! Field order follows the record's declaration order.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use alertsync_core::Guid;

use crate::error::StoreError;

/// Encode a record as a single-line JSON payload.
pub fn encode<S: Serialize>(spec: &S) -> Result<String, StoreError> {
    Ok(serde_json::to_string(spec)?)
}

/// Decode a stored payload into a record.
pub fn decode<S: DeserializeOwned>(payload: &str) -> Result<S, serde_json::Error> {
    serde_json::from_str(payload)
}

/// The `GUID` field of a raw payload, if it has a string one.
///
/// This is the lookup the store performs for `<column>:GUID = ?`.
pub fn payload_guid(payload: &str) -> Option<Guid> {
    let value: Value = serde_json::from_str(payload).ok()?;
    value.get("GUID")?.as_str().map(Guid::from)
}
