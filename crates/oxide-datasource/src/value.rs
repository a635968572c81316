//! Bound values and records.
//!
//! Values never appear inside SQL text. They travel next to it and are bound
//! positionally by the transport.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// A record exchanged with the model layer: field name to value.
pub type Record = BTreeMap<String, Value>;

/// A value that can be bound to a statement parameter or read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Converts a JSON value into a bindable value.
    ///
    /// Objects and arrays are bound as their JSON text, since no structured
    /// column type is assumed to exist.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Self::Text(value.to_string())
            }
        }
    }
}

/// Trait for types that can be converted to values.
pub trait ToValue {
    /// Converts into a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl ToValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(self) -> Value {
        Value::Blob(self)
    }
}

/// Builds a record from a JSON object.
///
/// # Errors
///
/// Returns [`CompileError::InvalidRecord`] when the JSON is not an object.
pub fn record_from_json(value: &serde_json::Value) -> Result<Record, CompileError> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect()),
        other => Err(CompileError::InvalidRecord(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
        assert_eq!(Value::from_json(&serde_json::json!(true)), Value::Bool(true));
        assert_eq!(Value::from_json(&serde_json::json!(42)), Value::Int(42));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Value::Float(2.5));
        assert_eq!(
            Value::from_json(&serde_json::json!("abc")),
            Value::Text("abc".to_string())
        );
    }

    #[test]
    fn test_from_json_object_is_text() {
        let v = Value::from_json(&serde_json::json!({"a": 1}));
        assert_eq!(v, Value::Text("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_record_from_json() {
        let record = record_from_json(&serde_json::json!({"_id": "abc", "age": 3})).unwrap();
        assert_eq!(record["_id"], Value::Text("abc".to_string()));
        assert_eq!(record["age"], Value::Int(3));
        assert!(record_from_json(&serde_json::json!([1, 2])).is_err());
    }

    #[test]
    fn test_conversions() {
        assert_eq!("x".to_value(), Value::Text("x".to_string()));
        assert_eq!(7_i32.to_value(), Value::Int(7));
        assert_eq!(None::<i64>.to_value(), Value::Null);
    }
}
