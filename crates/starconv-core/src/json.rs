//! JSON interop for dynamic values.
//!
//! Values serialize through `serde` so they can be logged, stored or handed
//! to JSON-speaking services. Structs serialize as plain objects (the brand
//! is dropped), dict keys serialize as their natural text, and callables
//! cannot be serialized at all.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use starconv_core::json::{from_json, to_json};
//!
//! let value = from_json(json!({"name": "Alice", "tags": ["a", "b"]}));
//! assert_eq!(to_json(&value).unwrap(), json!({"name": "Alice", "tags": ["a", "b"]}));
//! ```

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::value::{Dict, Value};

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serialize_int(i, serializer),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Dict(d) => {
                let mut map = serializer.serialize_map(Some(d.len()))?;
                for (k, v) in d.iter() {
                    let key = k.key_text().ok_or_else(|| {
                        S::Error::custom(format!("{} dict key is not serializable", k.type_name()))
                    })?;
                    map.serialize_entry(&key, v)?;
                }
                map.end()
            }
            Value::Struct(s) => {
                let mut map = serializer.serialize_map(Some(s.len()))?;
                for (name, value) in s.fields() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Callable(c) => Err(S::Error::custom(format!(
                "{} {} is not serializable",
                c.type_name(),
                c.name()
            ))),
        }
    }
}

fn serialize_int<S>(i: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if let Some(v) = i.to_i64() {
        serializer.serialize_i64(v)
    } else if let Some(v) = i.to_u64() {
        serializer.serialize_u64(v)
    } else {
        Err(S::Error::custom(format!("int {i} out of range")))
    }
}

/// Serialize a value into a `serde_json::Value`.
pub fn to_json(value: &Value) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(value)
}

/// Convert JSON into a dynamic value. Objects become dicts with string keys
/// in document order.
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(BigInt::from(i))
            } else if let Some(u) = n.as_u64() {
                Value::Int(BigInt::from(u))
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut dict = Dict::with_capacity(map.len());
            for (k, v) in map {
                // String keys are always hashable.
                let _ = dict.insert(Value::String(k), from_json(v));
            }
            Value::Dict(dict)
        }
    }
}
