//! Salt API response envelope decoding.
//!
//! Every successful answer has the shape `{"return": [ {...} ]}`; the single
//! object in the `return` list is the actual payload.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ProtocolError;

use super::executor::RawResponse;

/// Extract the nested payload object from a raw response.
pub fn decode_envelope(response: RawResponse) -> Result<Map<String, Value>, ProtocolError> {
    // No decode on errors: Salt API may answer with HTML.
    if response.status != 200 {
        return Err(ProtocolError::status_error(
            response.status,
            response.body.as_deref(),
        ));
    }

    let body = response
        .body
        .ok_or_else(|| ProtocolError::malformed("response body could not be read"))?;

    let envelope: Value = serde_json::from_slice(&body)
        .map_err(|e| ProtocolError::malformed(format!("invalid JSON: {}", e)))?;

    let mut envelope = match envelope {
        Value::Object(map) => map,
        other => {
            return Err(ProtocolError::malformed(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            )));
        }
    };

    let items = match envelope.remove("return") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ProtocolError::malformed(format!(
                "`return` must be a list, got {}",
                kind_of(&other)
            )));
        }
        None => return Err(ProtocolError::malformed("missing `return` field")),
    };

    if items.len() != 1 {
        return Err(ProtocolError::malformed(format!(
            "`return` must hold exactly one item, got {}",
            items.len()
        )));
    }

    match items.into_iter().next() {
        Some(Value::Object(payload)) => Ok(payload),
        Some(other) => Err(ProtocolError::malformed(format!(
            "`return` item must be an object, got {}",
            kind_of(&other)
        ))),
        None => Err(ProtocolError::malformed("`return` list is empty")),
    }
}

/// Decode the nested payload object into a typed value.
pub fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<T, ProtocolError> {
    let payload = decode_envelope(response)?;
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ProtocolError::malformed(format!("unexpected payload: {}", e)))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
