//! Asset data model types.
//!
//! These types describe a single resource in the asset data tree:
//! - Who may write it (`AccessKind`)
//! - What it currently holds (`ResourceValue`)
//! - Which namespace a client resolves paths in (`Namespace`)
//! - Events reported to resource handlers (`ResourceEvent`)

use serde::{Deserialize, Serialize};

use crate::path::ResourcePath;

/// Which side is allowed to write a resource.
///
/// Fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    /// Written by local application code, read by the management side.
    Variable,
    /// Written by the management side only, read locally.
    Setting,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessKind::Variable => f.write_str("variable"),
            AccessKind::Setting => f.write_str("setting"),
        }
    }
}

/// The value held by a resource.
///
/// On the wire this is plain JSON: integers, numbers with a fraction,
/// strings, booleans, and `null` for [`ResourceValue::Unset`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    /// No permitted writer has stored a value yet.
    #[default]
    Unset,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// The scalar type of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    String,
    Float,
    Bool,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl ResourceValue {
    /// True once a value has been stored.
    pub fn is_set(&self) -> bool {
        !matches!(self, ResourceValue::Unset)
    }

    /// The scalar type held, or `None` when unset.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            ResourceValue::Unset => None,
            ResourceValue::Int(_) => Some(ValueType::Int),
            ResourceValue::Str(_) => Some(ValueType::String),
            ResourceValue::Float(_) => Some(ValueType::Float),
            ResourceValue::Bool(_) => Some(ValueType::Bool),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ResourceValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResourceValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ResourceValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ResourceValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Convert to a JSON value for tree reads.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ResourceValue::Unset => serde_json::Value::Null,
            ResourceValue::Int(v) => serde_json::json!(v),
            ResourceValue::Str(v) => serde_json::json!(v),
            ResourceValue::Float(v) => serde_json::json!(v),
            ResourceValue::Bool(v) => serde_json::json!(v),
        }
    }
}

impl From<i64> for ResourceValue {
    fn from(v: i64) -> Self {
        ResourceValue::Int(v)
    }
}

impl From<f64> for ResourceValue {
    fn from(v: f64) -> Self {
        ResourceValue::Float(v)
    }
}

impl From<bool> for ResourceValue {
    fn from(v: bool) -> Self {
        ResourceValue::Bool(v)
    }
}

impl From<&str> for ResourceValue {
    fn from(v: &str) -> Self {
        ResourceValue::Str(v.to_string())
    }
}

impl From<String> for ResourceValue {
    fn from(v: String) -> Self {
        ResourceValue::Str(v)
    }
}

/// A single node in the asset data tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Canonical path of the resource (namespace prefix included)
    pub path: ResourcePath,
    /// Permitted writer, immutable after creation
    pub access: AccessKind,
    /// Current value
    pub value: ResourceValue,
}

impl Resource {
    /// A freshly created resource with no value.
    pub fn new(path: ResourcePath, access: AccessKind) -> Self {
        Self {
            path,
            access,
            value: ResourceValue::Unset,
        }
    }
}

/// Path namespace a client session resolves its paths in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Paths are nested under the client's application name.
    #[default]
    Application,
    /// Paths are used as given.
    Global,
}

/// What the management side did to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Read,
    Write,
}

/// Notification delivered to resource event handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEvent {
    /// Canonical path of the resource
    pub path: String,
    /// Access kind of the resource
    pub access: AccessKind,
    /// Whether the management side read or wrote the resource
    pub kind: EventKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(ResourceValue::Unset.value_type(), None);
        assert_eq!(ResourceValue::from(1234).value_type(), Some(ValueType::Int));
        assert_eq!(
            ResourceValue::from("test_string").value_type(),
            Some(ValueType::String)
        );
        assert_eq!(ResourceValue::from(123.4567).value_type(), Some(ValueType::Float));
        assert_eq!(ResourceValue::from(true).value_type(), Some(ValueType::Bool));
    }

    #[test]
    fn test_float_is_bit_exact() {
        let value = ResourceValue::from(123.4567);
        assert_eq!(value.as_float().map(f64::to_bits), Some(123.4567f64.to_bits()));
    }

    #[test]
    fn test_typed_accessors_reject_other_types() {
        let value = ResourceValue::from(1234);
        assert_eq!(value.as_int(), Some(1234));
        assert_eq!(value.as_bool(), None);
        assert_eq!(value.as_str(), None);
        assert_eq!(value.as_float(), None);
    }

    #[test]
    fn test_json_shape() {
        assert_eq!(
            serde_json::to_string(&ResourceValue::from(1234)).unwrap(),
            "1234"
        );
        assert_eq!(
            serde_json::to_string(&ResourceValue::from(1.0)).unwrap(),
            "1.0"
        );
        assert_eq!(serde_json::to_string(&ResourceValue::Unset).unwrap(), "null");

        let value: ResourceValue = serde_json::from_str("123.4567").unwrap();
        assert_eq!(value, ResourceValue::Float(123.4567));
        let value: ResourceValue = serde_json::from_str("42").unwrap();
        assert_eq!(value, ResourceValue::Int(42));
        let value: ResourceValue = serde_json::from_str("\"on\"").unwrap();
        assert_eq!(value, ResourceValue::Str("on".to_string()));
        let value: ResourceValue = serde_json::from_str("null").unwrap();
        assert_eq!(value, ResourceValue::Unset);
    }

    #[test]
    fn test_new_resource_is_unset() {
        let path = ResourcePath::parse("/test2/settingBool").unwrap();
        let resource = Resource::new(path, AccessKind::Setting);
        assert!(!resource.value.is_set());
        assert_eq!(resource.access, AccessKind::Setting);
    }
}
