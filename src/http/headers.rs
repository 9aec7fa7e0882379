// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Case-insensitive header table
//!
//! Keys are canonicalized to lowercase on store, so lookups, merges and
//! deletions never depend on the caller's casing.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// Case-insensitive header name/value table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderTable {
    inner: BTreeMap<String, String>,
}

impl HeaderTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (add/update) a single header, overwriting any previous value
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.inner
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Shallow-merge headers into the table: new keys override, others stay
    pub fn set_all<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.set(name, value);
        }
    }

    /// Delete headers by name, case-insensitively
    pub fn delete(&mut self, names: &[&str]) {
        for name in names {
            self.inner.remove(&name.to_ascii_lowercase());
        }
    }

    /// Look up a header value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Check if a header is present
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of headers
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over (name, value) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return a copy of this table merged with `other` (other wins)
    pub fn merged(&self, other: &HeaderTable) -> HeaderTable {
        let mut out = self.clone();
        out.set_all(other.iter());
        out
    }

    /// Convert to a reqwest `HeaderMap`, skipping names/values that are not
    /// valid on the wire
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.iter() {
            if let (Ok(name), Ok(value)) =
                (HeaderName::try_from(name), HeaderValue::try_from(value))
            {
                map.insert(name, value);
            }
        }
        map
    }

    /// Build a table from a received `HeaderMap`, lowercasing the names.
    /// Repeated headers are joined with `, ` per RFC 9110 list syntax.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut table = HeaderTable::new();
        for name in map.keys() {
            let joined = map
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            table.set(name.as_str(), joined);
        }
        table
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = HeaderTable::new();
        table.set_all(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_lowercased() {
        let mut t = HeaderTable::new();
        t.set("Content-Type", "text/html");
        assert_eq!(t.get("content-type"), Some("text/html"));
        assert!(t.iter().all(|(k, _)| k == k.to_ascii_lowercase()));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut t = HeaderTable::new();
        t.set("accept", "*/*");
        assert_eq!(t.get("ACCEPT"), Some("*/*"));
        assert!(t.contains("Accept"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut t = HeaderTable::new();
        t.set("accept", "*/*");
        t.set("Accept", "application/json");
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("accept"), Some("application/json"));
    }

    #[test]
    fn test_shallow_merge() {
        let mut t = HeaderTable::new();
        t.set("accept", "*/*");
        t.set("connection", "close");
        t.set_all([("Accept", "application/json"), ("x-new", "1")]);
        assert_eq!(t.get("accept"), Some("application/json"));
        assert_eq!(t.get("connection"), Some("close"));
        assert_eq!(t.get("x-new"), Some("1"));
    }

    #[test]
    fn test_delete_case_insensitive() {
        let mut t = HeaderTable::new();
        t.set("content-type", "text/html");
        t.set("accept", "*/*");
        t.delete(&["Content-Type", "missing"]);
        assert!(!t.contains("content-type"));
        assert!(t.contains("accept"));
    }

    #[test]
    fn test_merged_other_wins() {
        let mut base = HeaderTable::new();
        base.set("accept", "*/*");
        base.set("connection", "close");
        let mut over = HeaderTable::new();
        over.set("accept", "application/json");

        let merged = base.merged(&over);
        assert_eq!(merged.get("accept"), Some("application/json"));
        assert_eq!(merged.get("connection"), Some("close"));
        // base untouched
        assert_eq!(base.get("accept"), Some("*/*"));
    }

    #[test]
    fn test_to_header_map_skips_invalid() {
        let mut t = HeaderTable::new();
        t.set("accept", "*/*");
        t.set("bad name", "x");
        let map = t.to_header_map();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("accept"));
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        map.append("set-cookie", HeaderValue::from_static("a=1"));
        map.append("set-cookie", HeaderValue::from_static("b=2"));
        let t = HeaderTable::from_header_map(&map);
        assert_eq!(t.get("content-encoding"), Some("gzip"));
        assert_eq!(t.get("set-cookie"), Some("a=1, b=2"));
    }
}
