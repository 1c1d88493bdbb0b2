use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dynamic value held in node metadata, step outputs and the variable
/// environment.
///
/// Serialized as plain JSON so workflow documents keep their natural shape.
/// Integral JSON numbers deserialize as [`Value::Integer`], everything else
/// numeric as [`Value::Number`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in type mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(map: HashMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Number(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_json_numbers_stay_integers() {
        let value: Value = serde_json::from_str("25").unwrap();
        assert_eq!(value, Value::Integer(25));
        assert_eq!(value.as_f64(), Some(25.0));

        let value: Value = serde_json::from_str("25.5").unwrap();
        assert_eq!(value, Value::Number(25.5));
    }

    #[test]
    fn serializes_as_plain_json() {
        let mut map = HashMap::new();
        map.insert("city".to_string(), Value::from("Sydney"));
        map.insert("lat".to_string(), Value::from(-33.8688));
        let json = serde_json::to_value(Value::Object(map)).unwrap();

        assert_eq!(json, serde_json::json!({"city": "Sydney", "lat": -33.8688}));
    }

    #[test]
    fn accessors_reject_other_shapes() {
        let value = Value::from("hello");
        assert_eq!(value.as_str(), Some("hello"));
        assert_eq!(value.as_f64(), None);
        assert_eq!(value.as_bool(), None);
        assert!(value.as_array().is_none());
        assert_eq!(value.type_name(), "string");
    }

    #[test]
    fn converts_from_serde_json() {
        let value = Value::from(serde_json::json!({"fields": ["name", 3, true]}));
        let fields = value.as_object().unwrap()["fields"].as_array().unwrap();
        assert_eq!(fields[0], Value::from("name"));
        assert_eq!(fields[1], Value::Integer(3));
        assert_eq!(fields[2], Value::Bool(true));
    }
}
