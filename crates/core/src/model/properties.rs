//! Scalar property values attached to nodes and relationships

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property mapping of a node or relationship
///
/// Ordered so that statements and log lines built from it are deterministic.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A scalar property value
///
/// `Null` is a real value: a key mapped to `Null` is distinct from an absent key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Convert a JSON value returned by a store into a scalar property
    ///
    /// Returns `None` for arrays and objects, which are not scalar.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float)),
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::cypher::cypher_str(self))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Build a [`Properties`] map from `key => value` pairs
///
/// ```
/// use graphlink_core::{props, PropertyValue};
///
/// let p = props! { "since" => 2006, "dummy" => PropertyValue::Null };
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::model::Properties::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::model::Properties::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::model::PropertyValue::from($value),
            );
        )+
        map
    }};
}
