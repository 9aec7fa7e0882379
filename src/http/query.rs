// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Query string codec with scalar type inference
//!
//! Turns `?x=abc&y=123&z=true` into a typed mapping `{x: "abc", y: 123,
//! z: true}`. Declaration order is preserved, which is why this is backed by
//! a pair vector rather than a hash map.

use percent_encoding::percent_decode_str;
use serde::Serialize;

/// A query string value after type inference
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Whole number, e.g. `"12"`
    Int(i64),
    /// Number with a decimal point, e.g. `"12.5"`
    Float(f64),
    /// Exactly `"true"` or `"false"`
    Bool(bool),
    /// Valid JSON text, e.g. `{"a":1}`
    Json(serde_json::Value),
    /// Anything else, kept as a string
    Text(String),
}

impl QueryValue {
    /// Get the value as text, if it is one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            QueryValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            QueryValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a float, if it is one
    pub fn as_float(&self) -> Option<f64> {
        match self {
            QueryValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the value as a boolean, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as parsed JSON, if it is one
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            QueryValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoded query string, declaration order preserved
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryMap {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryMap {
    /// Create an empty query map
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a query string (`a=1&b=true`, leading `?` allowed)
    ///
    /// Pairs with an empty key are skipped. When `encode_uri` is active the
    /// caller has already percent-encoded the URL itself, so string values
    /// are kept raw instead of being decoded.
    pub fn decode(query_string: &str, encode_uri: bool) -> Self {
        let mut pairs = Vec::new();

        let trimmed = query_string.trim_start_matches('?');
        for elem in trimmed.split('&') {
            let (key, value) = match elem.split_once('=') {
                Some((k, v)) => (k, v),
                None => (elem, ""),
            };
            if key.is_empty() {
                continue;
            }
            pairs.push((key.to_string(), infer_type(value, encode_uri)));
        }

        Self { pairs }
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Check if a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of decoded pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }
}

/// Run the inference chain over a raw query value.
///
/// Order matters: integer and float checks must precede the generic JSON
/// parse, otherwise `"12"` would come back as a JSON number with no way to
/// tell it apart from the string `"12"` quoted in JSON.
fn infer_type(raw: &str, encode_uri: bool) -> QueryValue {
    if !raw.is_empty() {
        if !raw.contains('.') {
            if let Ok(n) = raw.parse::<i64>() {
                return QueryValue::Int(n);
            }
        } else if let Ok(n) = raw.parse::<f64>() {
            return QueryValue::Float(n);
        }
    }

    match raw {
        "true" => return QueryValue::Bool(true),
        "false" => return QueryValue::Bool(false),
        _ => {}
    }

    if !raw.is_empty() {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
            return QueryValue::Json(value);
        }
    }

    let text = if encode_uri {
        raw.to_string()
    } else {
        percent_decode_str(raw)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    };
    QueryValue::Text(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_inference() {
        let q = QueryMap::decode("a=12", false);
        assert_eq!(q.get("a"), Some(&QueryValue::Int(12)));
    }

    #[test]
    fn test_float_inference() {
        let q = QueryMap::decode("a=12.5", false);
        assert_eq!(q.get("a"), Some(&QueryValue::Float(12.5)));
    }

    #[test]
    fn test_bool_inference() {
        let q = QueryMap::decode("a=true&b=false", false);
        assert_eq!(q.get("a"), Some(&QueryValue::Bool(true)));
        assert_eq!(q.get("b"), Some(&QueryValue::Bool(false)));
    }

    #[test]
    fn test_json_inference() {
        let q = QueryMap::decode(r#"a={"x":1}"#, false);
        let value = q.get("a").and_then(|v| v.as_json()).unwrap();
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn test_text_fallback() {
        let q = QueryMap::decode("a=abc", false);
        assert_eq!(q.get("a"), Some(&QueryValue::Text("abc".to_string())));
    }

    #[test]
    fn test_integers_win_over_json() {
        // "12" is also valid JSON; the numeric branch must fire first
        let q = QueryMap::decode("a=12", false);
        assert!(q.get("a").unwrap().as_int().is_some());
        assert!(q.get("a").unwrap().as_json().is_none());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let q = QueryMap::decode("z=1&a=2&m=3", false);
        let keys: Vec<&str> = q.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_empty_keys_skipped() {
        let q = QueryMap::decode("=orphan&a=1&&b=2", false);
        assert_eq!(q.len(), 2);
        assert!(q.contains("a"));
        assert!(q.contains("b"));
    }

    #[test]
    fn test_leading_question_mark() {
        let q = QueryMap::decode("?category=databases", false);
        assert_eq!(
            q.get("category"),
            Some(&QueryValue::Text("databases".to_string()))
        );
    }

    #[test]
    fn test_percent_decoding() {
        let q = QueryMap::decode("a=hello%20world", false);
        assert_eq!(q.get("a").unwrap().as_text(), Some("hello world"));
    }

    #[test]
    fn test_raw_text_when_encode_uri() {
        let q = QueryMap::decode("a=hello%20world", true);
        assert_eq!(q.get("a").unwrap().as_text(), Some("hello%20world"));
    }

    #[test]
    fn test_missing_value() {
        let q = QueryMap::decode("flag", false);
        assert_eq!(q.get("flag"), Some(&QueryValue::Text(String::new())));
    }

    #[test]
    fn test_empty_query() {
        let q = QueryMap::decode("", false);
        assert!(q.is_empty());
    }
}
