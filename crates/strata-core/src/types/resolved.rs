//! Resolved configuration containers
//!
//! The finder converts its merged [`Value`] into a [`ConfigValue`]. Hashes
//! look keys up by their canonical string form and support dotted paths
//! (`"database.replicas.0.host"`). Containers can be sealed, after which every
//! mutating call fails with [`ConfigError::Frozen`].

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::value::Value;
use crate::error::{ConfigError, ConfigResult};

/// A resolved configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
    String(String),
    List(ConfigList),
    Hash(ConfigHash),
}

impl ConfigValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Non-negative integer value, whichever variant holds it
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConfigValue::Integer(n) => u64::try_from(*n).ok(),
            ConfigValue::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value as a float (integers are widened)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(n) => Some(*n),
            ConfigValue::Integer(n) => Some(*n as f64),
            ConfigValue::Unsigned(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&ConfigHash> {
        match self {
            ConfigValue::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ConfigList> {
        match self {
            ConfigValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Look up a direct child of a hash value
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_hash().and_then(|hash| hash.get(key))
    }

    /// Follow a dotted path through nested hashes and lists
    ///
    /// A literal key containing dots wins over splitting it. Numeric segments
    /// index into lists.
    pub fn dig(&self, path: &str) -> Option<&ConfigValue> {
        match self {
            ConfigValue::Hash(hash) => hash.dig(path),
            ConfigValue::List(list) => list.dig(path),
            _ => None,
        }
    }

    /// Recursively freeze every container in this value
    pub fn seal(&mut self) {
        match self {
            ConfigValue::Hash(hash) => hash.seal(),
            ConfigValue::List(list) => list.seal(),
            _ => {}
        }
    }

    /// Whether this value is a sealed container
    ///
    /// Scalars carry no flag and always report `false`.
    pub fn is_frozen(&self) -> bool {
        match self {
            ConfigValue::Hash(hash) => hash.is_frozen(),
            ConfigValue::List(list) => list.is_frozen(),
            _ => false,
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }

    /// Deserialize into a typed structure
    pub fn deserialize<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        serde_json::from_value(self.to_json())
            .map_err(|e| ConfigError::decode(std::any::type_name::<T>(), e))
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Integer(n) => ConfigValue::Integer(n),
            Value::Unsigned(n) => ConfigValue::Unsigned(n),
            Value::Float(n) => ConfigValue::Float(n),
            Value::String(s) => ConfigValue::String(s),
            Value::Sequence(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Mapping(map) => ConfigValue::Hash(
                map.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Integer(i64::from(n))
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Integer(n)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Float(n)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&ConfigValue> for serde_json::Value {
    fn from(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Integer(n) => serde_json::Value::from(*n),
            ConfigValue::Unsigned(n) => serde_json::Value::from(*n),
            ConfigValue::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::List(list) => {
                serde_json::Value::Array(list.iter().map(serde_json::Value::from).collect())
            }
            ConfigValue::Hash(hash) => serde_json::Value::Object(
                hash.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(n) => serializer.serialize_i64(*n),
            ConfigValue::Unsigned(n) => serializer.serialize_u64(*n),
            ConfigValue::Float(n) => serializer.serialize_f64(*n),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::List(list) => list.serialize(serializer),
            ConfigValue::Hash(hash) => hash.serialize(serializer),
        }
    }
}

/// Insertion-ordered hash with canonical string keys
#[derive(Debug, Clone, Default)]
pub struct ConfigHash {
    entries: IndexMap<String, ConfigValue>,
    frozen: bool,
}

impl ConfigHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ConfigValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow a dotted path starting at this hash
    pub fn dig(&self, path: &str) -> Option<&ConfigValue> {
        if let Some(value) = self.entries.get(path) {
            return Some(value);
        }
        let (head, rest) = path.split_once('.')?;
        self.entries.get(head)?.dig(rest)
    }

    /// Insert or replace an entry, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> ConfigResult<Option<ConfigValue>> {
        let key = key.into();
        self.ensure_mutable(&key)?;
        Ok(self.entries.insert(key, value.into()))
    }

    /// Remove an entry, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> ConfigResult<Option<ConfigValue>> {
        self.ensure_mutable(key)?;
        Ok(self.entries.shift_remove(key))
    }

    pub fn get_mut(&mut self, key: &str) -> ConfigResult<Option<&mut ConfigValue>> {
        self.ensure_mutable(key)?;
        Ok(self.entries.get_mut(key))
    }

    pub fn seal(&mut self) {
        for value in self.entries.values_mut() {
            value.seal();
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_mutable(&self, key: &str) -> ConfigResult<()> {
        if self.frozen {
            Err(ConfigError::Frozen(format!("hash (key {key:?})")))
        } else {
            Ok(())
        }
    }
}

impl PartialEq for ConfigHash {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigHash {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            frozen: false,
        }
    }
}

impl<'a> IntoIterator for &'a ConfigHash {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = indexmap::map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for ConfigHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Ordered list of resolved values
#[derive(Debug, Clone, Default)]
pub struct ConfigList {
    items: Vec<ConfigValue>,
    frozen: bool,
}

impl ConfigList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<&ConfigValue> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigValue> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn dig(&self, path: &str) -> Option<&ConfigValue> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let item = self.items.get(head.parse::<usize>().ok()?)?;
        match rest {
            Some(rest) => item.dig(rest),
            None => Some(item),
        }
    }

    pub fn push(&mut self, value: impl Into<ConfigValue>) -> ConfigResult<()> {
        self.ensure_mutable()?;
        self.items.push(value.into());
        Ok(())
    }

    pub fn get_mut(&mut self, index: usize) -> ConfigResult<Option<&mut ConfigValue>> {
        self.ensure_mutable()?;
        Ok(self.items.get_mut(index))
    }

    pub fn seal(&mut self) {
        for item in &mut self.items {
            item.seal();
        }
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_mutable(&self) -> ConfigResult<()> {
        if self.frozen {
            Err(ConfigError::Frozen("list".to_string()))
        } else {
            Ok(())
        }
    }
}

impl PartialEq for ConfigList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl FromIterator<ConfigValue> for ConfigList {
    fn from_iter<I: IntoIterator<Item = ConfigValue>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            frozen: false,
        }
    }
}

impl<'a> IntoIterator for &'a ConfigList {
    type Item = &'a ConfigValue;
    type IntoIter = std::slice::Iter<'a, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for ConfigList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}
