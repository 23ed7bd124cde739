//! Ordered map type for [`Value`] objects.
//!
//! [`Map`] wraps an [`IndexMap`] so object entries keep their insertion
//! order. Query output follows container iteration order, so a `Map` always
//! encodes its entries in the order they were inserted.
//!
//! ## Examples
//!
//! ```rust
//! use apiquery::{to_pairs, Map, Value};
//!
//! let mut map = Map::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(to_pairs(&map).unwrap(), [("name", "Alice"), ("age", "30")]);
//! ```

use crate::collections::{map_stringifier, Mapping};
use crate::encode::{Kind, QueryEncode, Stringifier};
use crate::{Encoder, Result, Value};
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to dynamic values.
///
/// # Examples
///
/// ```rust
/// use apiquery::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map(IndexMap<String, Value>);

impl Map {
    #[must_use]
    pub fn new() -> Self {
        Map(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its original position.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Mapping for Map {
    type Key = String;
    type Value = Value;
    type Iter<'a> = indexmap::map::Iter<'a, String, Value> where Self: 'a;

    fn entries(&self) -> Self::Iter<'_> {
        self.0.iter()
    }
}

impl QueryEncode for Map {
    const KIND: Kind = Kind::Map;

    fn build_stringifier(encoder: &Encoder) -> Result<Stringifier<Self>> {
        map_stringifier::<Self>(encoder)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl From<HashMap<String, Value>> for Map {
    fn from(map: HashMap<String, Value>) -> Self {
        Map(map.into_iter().collect())
    }
}

impl From<Map> for HashMap<String, Value> {
    fn from(map: Map) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;

    #[test]
    fn test_insertion_order_is_encoding_order() {
        let map: Map = [("z", 1), ("a", 2), ("m", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::from(v)))
            .collect();
        let pairs = Encoder::new(Settings::default())
            .encode_with_prefix("f", &map)
            .unwrap();
        assert_eq!(pairs, [("f[z]", "1"), ("f[a]", "2"), ("f[m]", "3")]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        map.insert("c".to_string(), Value::from(3));
        assert_eq!(map.remove("a"), Some(Value::from(1)));
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "c"]);
    }
}
