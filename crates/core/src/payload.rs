//! Payload transformation
//!
//! Outgoing bodies lose their `null` fields; incoming bodies are unwrapped
//! from the `{data, meta}` envelope. Both functions are total over JSON.

use conduit_domain::ApiResponse;
use serde_json::{Map, Value};

/// Remove object keys whose value is `null`, recursing into nested objects.
///
/// Arrays and primitives pass through unchanged, including any `null`
/// elements inside arrays. The input is not modified.
pub fn prepare_outgoing(body: &Value) -> Value {
    match body {
        Value::Object(map) => Value::Object(strip_nulls(map)),
        other => other.clone(),
    }
}

fn strip_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), prepare_outgoing(value)))
        .collect()
}

/// Split a response body into application data and metadata.
///
/// An object with a `data` key yields `(data, meta)`; any other payload is
/// treated as bare data with no metadata. A `null` meta counts as absent.
pub fn unwrap_incoming(raw: Value) -> ApiResponse<Value> {
    match raw {
        Value::Object(mut map) if map.contains_key("data") => {
            let data = map.remove("data").unwrap_or(Value::Null);
            let meta = map.remove("meta").filter(|m| !m.is_null());
            ApiResponse::new(data, meta)
        }
        other => ApiResponse::new(other, None),
    }
}
