//! Firestore Value Codec
//!
//! Converts between plain JSON and the typed value encoding of the
//! Firestore REST API (`{"stringValue": "..."}`, `{"integerValue": "7"}`, ...).

use serde_json::{json, Map, Number, Value};

use crate::error::{StoreError, StoreResult};

// == Encode ==
/// Encodes a plain JSON value as a Firestore value.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore integers are 64-bit and travel as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode).collect::<Vec<_>>() } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encodes every entry of a JSON object.
pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect()
}

// == Decode ==
/// Decodes a Firestore value into plain JSON.
///
/// Timestamps, references and bytes come back as their string payloads,
/// geo points as `{latitude, longitude}`.
pub fn decode(value: &Value) -> StoreResult<Value> {
    let (tag, payload) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| StoreError::Decode(format!("not a firestore value: {value}")))?;

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => payload
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| invalid(tag, payload)),
        "integerValue" => decode_integer(payload).ok_or_else(|| invalid(tag, payload)),
        "doubleValue" => decode_double(payload).ok_or_else(|| invalid(tag, payload)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => payload
            .as_str()
            .map(Value::from)
            .ok_or_else(|| invalid(tag, payload)),
        "geoPointValue" => Ok(payload.clone()),
        "arrayValue" => {
            let values = match payload.get("values") {
                Some(Value::Array(values)) => values.iter().map(decode).collect::<StoreResult<Vec<Value>>>()?,
                Some(other) => return Err(invalid(tag, other)),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match payload.get("fields") {
                Some(Value::Object(fields)) => decode_fields(fields)?,
                Some(other) => return Err(invalid(tag, other)),
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::Decode(format!(
            "unsupported firestore value type `{other}`"
        ))),
    }
}

/// Decodes every entry of a Firestore `fields` object.
pub fn decode_fields(fields: &Map<String, Value>) -> StoreResult<Map<String, Value>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode(value)?)))
        .collect()
}

fn decode_integer(payload: &Value) -> Option<Value> {
    match payload {
        Value::String(s) => s.parse::<i64>().ok().map(Value::from),
        Value::Number(n) => n.as_i64().map(Value::from),
        _ => None,
    }
}

fn decode_double(payload: &Value) -> Option<Value> {
    match payload {
        Value::Number(n) => Some(Value::Number(n.clone())),
        // NaN and the infinities have no JSON number form
        Value::String(s) => match s.as_str() {
            "NaN" | "Infinity" | "-Infinity" => Some(Value::Null),
            _ => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
        },
        _ => None,
    }
}

fn invalid(tag: &str, payload: &Value) -> StoreError {
    StoreError::Decode(format!("invalid {tag} payload: {payload}"))
}
