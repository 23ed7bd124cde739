//! Multi-valued query parameters.
//!
//! [`QueryValues`] is the result of [`marshal`](crate::marshal): every key
//! maps to the list of values it was emitted with. Keys keep the order in
//! which they were first seen and values keep emission order.
//! [`QueryValues::encode`] renders a URL query string with sorted keys.

use crate::encode::Pair;
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Everything except the RFC 3986 unreserved characters.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Ordered map from query keys to their values.
///
/// # Examples
///
/// ```rust
/// use apiquery::{Pair, QueryValues};
///
/// let values = QueryValues::from_pairs(vec![
///     Pair::new("tag", "a"),
///     Pair::new("q", "x y"),
///     Pair::new("tag", "b"),
/// ]);
///
/// assert_eq!(values.get("tag"), Some("a"));
/// assert_eq!(values.get_all("tag"), ["a", "b"]);
/// assert_eq!(values.encode(), "q=x%20y&tag=a&tag=b");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryValues(IndexMap<String, Vec<String>>);

impl QueryValues {
    #[must_use]
    pub fn new() -> Self {
        QueryValues(IndexMap::new())
    }

    /// Groups pairs by key.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = Pair>,
    {
        let mut values = QueryValues::new();
        for pair in pairs {
            values.append(pair.key, pair.value);
        }
        values
    }

    /// Adds a value after any existing values for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces all values for `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// The first value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`, empty if the key is absent.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.shift_remove(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<String>> {
        self.0.iter()
    }

    /// Flattens back into pairs, grouped by key in first-seen order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    #[must_use]
    pub fn into_pairs(self) -> Vec<Pair> {
        self.0
            .into_iter()
            .flat_map(|(key, values)| {
                values
                    .into_iter()
                    .map(move |value| Pair::new(key.clone(), value))
            })
            .collect()
    }

    /// Renders a URL query string (without the leading `?`).
    ///
    /// Keys are sorted, values stay in order, and both are percent-encoded
    /// leaving only `A-Z a-z 0-9 - . _ ~` unescaped.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();

        let mut out = String::new();
        for key in keys {
            let encoded_key = utf8_percent_encode(key, QUERY_ENCODE_SET).to_string();
            for value in &self.0[key] {
                if !out.is_empty() {
                    out.push('&');
                }
                out.push_str(&encoded_key);
                out.push('=');
                out.extend(utf8_percent_encode(value, QUERY_ENCODE_SET));
            }
        }
        out
    }
}

impl fmt::Display for QueryValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromIterator<Pair> for QueryValues {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        QueryValues::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a QueryValues {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryValues {
        QueryValues::from_pairs(vec![
            Pair::new("z", "1"),
            Pair::new("a[b]", "x&y"),
            Pair::new("z", "2"),
            Pair::new("empty", ""),
        ])
    }

    #[test]
    fn test_first_seen_key_order() {
        let values = sample();
        let keys: Vec<_> = values.keys().collect();
        assert_eq!(keys, ["z", "a[b]", "empty"]);
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_pairs_grouped_by_key() {
        let values = sample();
        let pairs: Vec<_> = values.pairs().collect();
        assert_eq!(pairs, [("z", "1"), ("z", "2"), ("a[b]", "x&y"), ("empty", "")]);
    }

    #[test]
    fn test_encode_sorts_and_escapes() {
        assert_eq!(sample().encode(), "a%5Bb%5D=x%26y&empty=&z=1&z=2");
        assert_eq!(QueryValues::new().encode(), "");
    }

    #[test]
    fn test_unreserved_and_unicode() {
        let mut values = QueryValues::new();
        values.set("k", "a-b.c_d~e f/é");
        assert_eq!(values.to_string(), "k=a-b.c_d~e%20f%2F%C3%A9");
    }

    #[test]
    fn test_set_remove_get_all() {
        let mut values = sample();
        values.set("z", "3");
        assert_eq!(values.get_all("z"), ["3"]);
        assert_eq!(values.remove("empty"), Some(vec![String::new()]));
        assert!(!values.contains_key("empty"));
        assert!(values.get_all("missing").is_empty());
        assert_eq!(values.get("missing"), None);
    }

    #[test]
    fn test_into_pairs() {
        let pairs = sample().into_pairs();
        assert_eq!(pairs[1], ("z", "2"));
        assert_eq!(pairs.len(), 4);
    }
}
