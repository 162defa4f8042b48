//! Host-side dynamic value
//!
//! `DynamicValue` is the tagged value every host API speaks: arguments of
//! custom events, resource exports, meta data and so on.

use crate::EntityRef;
use serde::{Deserialize, Serialize};

/// Tagged dynamic value with arbitrary nesting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DynamicValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<DynamicValue>),
    Dict(DynamicDict),
    Entity(EntityRef),
}

impl DynamicValue {
    /// Short name of the value kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Entity(_) => "entity",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as JSON for diagnostics
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(v) => Json::from(*v),
            Self::UInt(v) => Json::from(*v),
            Self::Double(v) => serde_json::Number::from_f64(*v)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Self::String(s) => Json::String(s.clone()),
            Self::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
            Self::List(items) => Json::Array(items.iter().map(|v| v.to_json()).collect()),
            Self::Dict(dict) => Json::Object(
                dict.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Self::Entity(entity) => serde_json::json!({
                "entity": entity.id.get(),
                "type": entity.kind.type_name(),
            }),
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for DynamicValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for DynamicValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for DynamicValue {
    fn from(v: u32) -> Self {
        Self::UInt(v as u64)
    }
}

impl From<u64> for DynamicValue {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<f64> for DynamicValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(v: Vec<DynamicValue>) -> Self {
        Self::List(v)
    }
}

impl From<DynamicDict> for DynamicValue {
    fn from(v: DynamicDict) -> Self {
        Self::Dict(v)
    }
}

impl From<EntityRef> for DynamicValue {
    fn from(v: EntityRef) -> Self {
        Self::Entity(v)
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Self::Int(v)
                } else if let Some(v) = n.as_u64() {
                    Self::UInt(v)
                } else {
                    Self::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Dict(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// String keyed map that keeps insertion order
///
/// Keys are unique: inserting an existing key replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicDict {
    entries: Vec<(String, DynamicValue)>,
}

impl DynamicDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: DynamicValue) -> Option<DynamicValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<DynamicValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, DynamicValue)> for DynamicDict {
    fn from_iter<I: IntoIterator<Item = (String, DynamicValue)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

impl IntoIterator for DynamicDict {
    type Item = (String, DynamicValue);
    type IntoIter = std::vec::IntoIter<(String, DynamicValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityId, EntityKind};
    use serde_json::json;

    #[test]
    fn test_dict_keeps_order_and_unique_keys() {
        let mut dict = DynamicDict::new();
        dict.insert("b", 1.into());
        dict.insert("a", 2.into());
        assert_eq!(dict.insert("b", 3.into()), Some(DynamicValue::Int(1)));

        let keys: Vec<&str> = dict.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(dict.get("b"), Some(&DynamicValue::Int(3)));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_dict_remove() {
        let mut dict: DynamicDict = vec![("x".to_string(), DynamicValue::Null)].into_iter().collect();
        assert!(dict.contains_key("x"));
        assert_eq!(dict.remove("x"), Some(DynamicValue::Null));
        assert!(dict.is_empty());
        assert_eq!(dict.remove("x"), None);
    }

    #[test]
    fn test_from_json() {
        let value = DynamicValue::from(json!({
            "name": "test",
            "count": 3,
            "big": u64::MAX,
            "ratio": 0.5,
            "tags": ["a", null],
        }));

        let DynamicValue::Dict(dict) = value else {
            panic!("expected dict");
        };
        assert_eq!(dict.get("name"), Some(&DynamicValue::from("test")));
        assert_eq!(dict.get("count"), Some(&DynamicValue::Int(3)));
        assert_eq!(dict.get("big"), Some(&DynamicValue::UInt(u64::MAX)));
        assert_eq!(dict.get("ratio"), Some(&DynamicValue::Double(0.5)));
        assert_eq!(
            dict.get("tags"),
            Some(&DynamicValue::List(vec!["a".into(), DynamicValue::Null]))
        );
    }

    #[test]
    fn test_to_json() {
        let entity = EntityRef::new(EntityId::new(7), EntityKind::Player, 1);
        let value = DynamicValue::List(vec![
            DynamicValue::Bytes(vec![1, 2]),
            DynamicValue::Entity(entity),
        ]);
        assert_eq!(
            value.to_json(),
            json!([[1, 2], { "entity": 7, "type": "Player" }])
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(DynamicValue::UInt(5).as_i64(), Some(5));
        assert_eq!(DynamicValue::UInt(u64::MAX).as_i64(), None);
        assert_eq!(DynamicValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(DynamicValue::from("x").as_str(), Some("x"));
        assert_eq!(DynamicValue::Null.kind_name(), "null");
    }
}
