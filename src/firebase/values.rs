//! Conversion between plain JSON and Firestore's typed value encoding.

use serde_json::{json, Map, Number, Value};

use crate::firebase::FirebaseError;

pub fn to_firestore(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // 64-bit integers travel as strings
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({
            "mapValue": { "fields": fields_to_firestore(fields) }
        }),
    }
}

pub fn fields_to_firestore(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), to_firestore(v)))
        .collect()
}

pub fn from_firestore(value: &Value) -> Result<Value, FirebaseError> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(FirebaseError::Decode(format!("not a typed value: {}", value)));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| decode_error(kind, inner)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| decode_error(kind, inner))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // NaN and infinities have no JSON form
            Value::String(_) => Ok(Value::Null),
            _ => Err(decode_error(kind, inner)),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| decode_error(kind, inner)),
        "geoPointValue" => {
            let coordinate = |name: &str| {
                inner
                    .get(name)
                    .and_then(Value::as_f64)
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            };
            Ok(json!({ "latitude": coordinate("latitude"), "longitude": coordinate("longitude") }))
        }
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(from_firestore).collect::<Result<Vec<_>, _>>())
            .unwrap_or_else(|| Ok(Vec::new()))
            .map(Value::Array),
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => fields_from_firestore(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        _ => Err(FirebaseError::Decode(format!("unsupported value type {}", kind))),
    }
}

pub fn fields_from_firestore(fields: &Map<String, Value>) -> Result<Map<String, Value>, FirebaseError> {
    fields
        .iter()
        .map(|(k, v)| from_firestore(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

/// Field paths containing anything beyond `[A-Za-z_][A-Za-z0-9_]*` must be
/// quoted with backticks in update masks.
pub fn quote_field_path(field: &str) -> String {
    let mut chars = field.chars();
    let simple = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn decode_error(kind: &str, inner: &Value) -> FirebaseError {
    FirebaseError::Decode(format!("bad {}: {}", kind, inner))
}
