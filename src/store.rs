//! Flattened key-value result set
//!
//! Keys compare case-insensitively: `Logging:Level` and `logging:level` are
//! the same key. Iteration is sorted under the same comparison.

use crate::error::FormatError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// A configuration key that keeps its original spelling but compares
/// ordinally after simple per-character uppercase folding.
#[derive(Debug, Clone)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Wraps a key
    pub fn new(key: impl Into<String>) -> Self {
        ConfigKey(key.into())
    }

    /// The key as it was first written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the key
    pub fn into_string(self) -> String {
        self.0
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().map(fold_char)
    }
}

fn fold_char(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_uppercase();
    }
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => simple_uppercase(c),
    }
}

/// Single-character uppercase mapping for characters whose full uppercase
/// form expands. Only the Greek letters with ypogegrammeni have one; the rest
/// (`ß`, ligatures, letters with combining marks) map to themselves.
fn simple_uppercase(c: char) -> char {
    match c {
        '\u{1F80}'..='\u{1F87}' | '\u{1F90}'..='\u{1F97}' | '\u{1FA0}'..='\u{1FA7}' => {
            char::from_u32(c as u32 + 8).unwrap_or(c)
        }
        '\u{1FB3}' => '\u{1FBC}',
        '\u{1FC3}' => '\u{1FCC}',
        '\u{1FF3}' => '\u{1FFC}',
        _ => c,
    }
}

impl Ord for ConfigKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl PartialOrd for ConfigKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConfigKey {}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates flattened entries for one parse operation.
///
/// A store is filled by a single traversal and then either finalized into a
/// [`FlatConfig`] or dropped along with the error that stopped the traversal.
#[derive(Debug, Default)]
pub struct FlatStore {
    entries: BTreeMap<ConfigKey, Option<String>>,
}

impl FlatStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; a key that is already present in any letter case is rejected
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Result<(), FormatError> {
        let key = ConfigKey::new(key);
        if self.entries.contains_key(&key) {
            return Err(FormatError::DuplicateKey {
                key: key.into_string(),
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Returns true if the key is present in any letter case
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&ConfigKey::new(key))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seals the store into its immutable, sorted result
    pub fn finalize(self) -> FlatConfig {
        FlatConfig {
            entries: self.entries,
        }
    }
}

/// The flattened configuration: sorted, case-insensitive, read-only.
///
/// Values are `None` where the document held `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    entries: BTreeMap<ConfigKey, Option<String>>,
}

impl FlatConfig {
    /// Looks up a key in any letter case.
    ///
    /// The outer `Option` tells whether the key exists, the inner one whether
    /// it holds a value or the null marker.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .get(&ConfigKey::new(key))
            .map(|value| value.as_deref())
    }

    /// Looks up a key, treating null and absence alike
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).flatten()
    }

    /// Returns true if the key is present in any letter case
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&ConfigKey::new(key))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in case-insensitive key order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Keys in case-insensitive order, spelled as in the document
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(ConfigKey::as_str)
    }

    /// Consumes the result into an ordered list of pairs
    pub fn into_vec(self) -> Vec<(String, Option<String>)> {
        self.into_iter().collect()
    }
}

/// Borrowing iterator over a [`FlatConfig`]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, ConfigKey, Option<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a FlatConfig {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for FlatConfig {
    type Item = (String, Option<String>);
    type IntoIter = std::iter::Map<
        btree_map::IntoIter<ConfigKey, Option<String>>,
        fn((ConfigKey, Option<String>)) -> (String, Option<String>),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .into_iter()
            .map(into_pair as fn((ConfigKey, Option<String>)) -> (String, Option<String>))
    }
}

fn into_pair((key, value): (ConfigKey, Option<String>)) -> (String, Option<String>) {
    (key.into_string(), value)
}

impl Serialize for FlatConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_keys_compare_case_insensitively() {
        assert_eq!(ConfigKey::new("Logging:Level"), ConfigKey::new("logging:LEVEL"));
        assert!(ConfigKey::new("a") < ConfigKey::new("B"));
        assert!(ConfigKey::new("b") > ConfigKey::new("A"));
        assert_eq!(ConfigKey::new("STRASSE"), ConfigKey::new("strasse"));
        assert_eq!(ConfigKey::new("ÄPFEL"), ConfigKey::new("äpfel"));
    }

    #[test]
    fn test_expanding_uppercase_uses_single_char_mapping() {
        assert_eq!(ConfigKey::new("\u{1FB3}"), ConfigKey::new("\u{1FBC}"));
        assert_eq!(ConfigKey::new("x\u{1F80}"), ConfigKey::new("X\u{1F88}"));
        assert_eq!(ConfigKey::new("\u{1FF3}"), ConfigKey::new("\u{1FFC}"));

        // No single-character uppercase exists for these
        assert_ne!(ConfigKey::new("ß"), ConfigKey::new("SS"));
        assert_ne!(ConfigKey::new("\u{FB00}"), ConfigKey::new("FF"));
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut store = FlatStore::new();
        store.insert("A", value("1")).unwrap();

        let err = store.insert("a", value("2")).unwrap_err();
        assert_eq!(
            err,
            FormatError::DuplicateKey {
                key: "a".to_string()
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_finalize_sorts_case_insensitively() {
        let mut store = FlatStore::new();
        store.insert("beta", value("2")).unwrap();
        store.insert("Alpha", value("1")).unwrap();
        store.insert("gamma", None).unwrap();
        store.insert("ALPHA:child", value("3")).unwrap();

        let config = store.finalize();
        let keys: Vec<&str> = config.keys().collect();
        assert_eq!(keys, vec!["Alpha", "ALPHA:child", "beta", "gamma"]);
    }

    #[test]
    fn test_lookup_ignores_case_and_keeps_null_marker() {
        let mut store = FlatStore::new();
        store.insert("Server:Port", value("8080")).unwrap();
        store.insert("Server:Proxy", None).unwrap();
        store.insert("Server:Name", value("")).unwrap();
        let config = store.finalize();

        assert_eq!(config.get("server:port"), Some(Some("8080")));
        assert_eq!(config.get("SERVER:PROXY"), Some(None));
        assert_eq!(config.get("server:name"), Some(Some("")));
        assert_eq!(config.get("server:missing"), None);
        assert_eq!(config.get_str("server:proxy"), None);
        assert!(config.contains_key("server:proxy"));
    }

    #[test]
    fn test_into_vec_and_serialize() {
        let mut store = FlatStore::new();
        store.insert("b", value("x")).unwrap();
        store.insert("a", None).unwrap();
        let config = store.finalize();

        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"a":null,"b":"x"}"#
        );
        assert_eq!(
            config.into_vec(),
            vec![("a".to_string(), None), ("b".to_string(), value("x"))]
        );
    }
}
