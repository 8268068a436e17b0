//! Conversions between Value, Fragment and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use factor_state::{Error, Fragment, StoreConfig, Value};

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let json = value_to_json(value);
    serde_json::from_value(json).map_err(|e| Error::decode(e.to_string()))
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::encode(e.to_string()))?;
    json_to_value(json).map_err(|e| match e {
        Error::Decode { message } => Error::Encode { message },
        other => other,
    })
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Bytes(b) => {
            // JSON doesn't have bytes, so we base64 encode
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&b);
            serde_json::Value::String(encoded)
        }
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
///
/// Integers are kept exact: a `u64` above `i64::MAX` is a decode error
/// rather than a lossy float.
pub fn json_to_value(json: serde_json::Value) -> Result<Value, Error> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_u64() {
                return Err(Error::decode(format!("integer {} does not fit in i64", n)));
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                return Err(Error::decode(format!("unsupported number {}", n)));
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(
            arr.into_iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        ),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| json_to_value(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(value)
}

/// Build a fragment from JSON. Objects become map fragments that merge;
/// everything else replaces. JSON has no delete marker, so deletions are
/// added with [`factor_state::TOMBSTONE`] afterwards.
pub fn fragment_from_json(json: serde_json::Value) -> Result<Fragment, Error> {
    json_to_value(json).map(Fragment::from)
}

/// Parse a [`StoreConfig`] from a JSON document. Missing fields take their
/// defaults.
pub fn config_from_json(json: &str) -> Result<StoreConfig, Error> {
    serde_json::from_str(json).map_err(|e| Error::decode(e.to_string()))
}
