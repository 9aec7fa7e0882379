// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Attempt records
//!
//! One [`Attempt`] is produced per physical request/response cycle,
//! including synthetic timeout and transport-error attempts that never got a
//! response. An attempt is immutable once resolved; the orchestrator only
//! appends them to an [`AttemptHistory`], never rewrites them.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::headers::HeaderTable;
use super::query::QueryMap;
use super::url::NormalizedUrl;

/// Request body payload: a structured JSON value or a raw string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Structured JSON value, serialized with `serde_json` on send
    Json(serde_json::Value),
    /// Raw text, sent as-is
    Text(String),
}

impl Payload {
    /// Serialize the payload to the text that goes on the wire
    pub fn to_body_string(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => text.clone(),
        }
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// Response content: text, or the parsed structure when the body was JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    /// Parsed JSON value
    Json(serde_json::Value),
    /// Plain text
    Text(String),
}

impl Content {
    /// Get the content as text, if it was not JSON
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the content as parsed JSON, if it was JSON
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Content::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Render the content as text regardless of variant
    pub fn to_text(&self) -> String {
        match self {
            Content::Text(s) => s.clone(),
            Content::Json(v) => v.to_string(),
        }
    }
}

/// Request side of an attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestRecord {
    /// Typed query mapping decoded from the request URL
    pub query: QueryMap,
    /// Headers sent with this attempt
    pub headers: HeaderTable,
    /// Body payload, when one was sent
    pub payload: Option<Payload>,
}

/// Response side of an attempt
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseRecord {
    /// Response headers, lowercase names; empty when no response arrived
    pub headers: HeaderTable,
    /// Response content; `None` when no response arrived
    pub content: Option<Content>,
}

/// Timing block for one attempt
#[derive(Debug, Clone, Serialize)]
pub struct AttemptTiming {
    /// When the request was issued
    pub request_at: DateTime<Utc>,
    /// When the attempt was resolved
    pub response_at: Option<DateTime<Utc>>,
    /// Seconds between the two
    pub duration_secs: Option<f64>,
}

impl AttemptTiming {
    fn started(request_at: DateTime<Utc>) -> Self {
        Self {
            request_at,
            response_at: None,
            duration_secs: None,
        }
    }

    fn stamp(&mut self) {
        let now = Utc::now();
        self.duration_secs =
            Some((now - self.request_at).num_milliseconds() as f64 / 1000.0);
        self.response_at = Some(now);
    }
}

/// One physical request/response cycle and its outcome
#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    /// Corrected request URL (the raw input when correction itself failed)
    pub url: String,
    /// Request method
    pub method: String,
    /// Response status code, 0 if never obtained
    pub status: u16,
    /// Status message or synthetic failure description
    pub status_message: String,
    /// HTTP version of the response, e.g. `"1.1"`
    pub http_version: Option<String>,
    /// Whether the body was decompressed (or claimed a compressed encoding)
    pub decompressed: bool,
    /// Whether the request went over https
    pub is_secure: bool,
    /// Request record
    pub req: RequestRecord,
    /// Response record
    pub res: ResponseRecord,
    /// Timing block
    pub time: AttemptTiming,
}

impl Attempt {
    /// Start an attempt record for a normalized URL, not yet resolved
    pub(crate) fn pending(
        parsed: &NormalizedUrl,
        method: &str,
        headers: HeaderTable,
        payload: Option<Payload>,
        request_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: parsed.as_str().to_string(),
            method: method.to_string(),
            status: 0,
            status_message: String::new(),
            http_version: None,
            decompressed: false,
            is_secure: parsed.is_secure,
            req: RequestRecord {
                query: parsed.query.clone(),
                headers,
                payload,
            },
            res: ResponseRecord::default(),
            time: AttemptTiming::started(request_at),
        }
    }

    /// Start an attempt record for a URL that failed normalization
    pub(crate) fn unparsed(
        raw_url: &str,
        method: &str,
        headers: HeaderTable,
        payload: Option<Payload>,
        request_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: raw_url.to_string(),
            method: method.to_string(),
            status: 0,
            status_message: String::new(),
            http_version: None,
            decompressed: false,
            is_secure: false,
            req: RequestRecord {
                query: QueryMap::new(),
                headers,
                payload,
            },
            res: ResponseRecord::default(),
            time: AttemptTiming::started(request_at),
        }
    }

    /// Resolve as a synthetic failure with no response (bad URL, transport
    /// error before any response arrived)
    pub(crate) fn resolve_failure(mut self, status: u16, message: String) -> Self {
        self.status = status;
        self.status_message = message;
        self.time.stamp();
        self
    }

    /// Resolve as a synthetic 408 timeout attempt
    pub(crate) fn resolve_timeout(self, timeout: Duration, url: &str) -> Self {
        let message = format!(
            "Request aborted due to timeout ({} ms) {}",
            timeout.as_millis(),
            url
        );
        self.resolve_failure(408, message)
    }

    /// Resolve with a received response
    pub(crate) fn resolve_response(
        mut self,
        status: u16,
        status_message: String,
        http_version: String,
        decompressed: bool,
        headers: HeaderTable,
        content: Content,
    ) -> Self {
        self.status = status;
        self.status_message = status_message;
        self.http_version = Some(http_version);
        self.decompressed = decompressed;
        self.res.headers = headers;
        self.res.content = Some(content);
        self.time.stamp();
        self
    }

    /// Check if the status is a 3xx redirect
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Check if the attempt timed out (408)
    pub fn is_timeout(&self) -> bool {
        self.status == 408
    }

    /// Check if the status is a 2xx success
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response content rendered as text, empty when none arrived
    pub fn content_text(&self) -> String {
        self.res
            .content
            .as_ref()
            .map(Content::to_text)
            .unwrap_or_default()
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.url, self.status)?;
        if !self.status_message.is_empty() {
            write!(f, " {}", self.status_message)?;
        }
        if let Some(secs) = self.time.duration_secs {
            write!(f, " ({:.3}s)", secs)?;
        }
        Ok(())
    }
}

/// Ordered attempts produced by one logical `ask` call.
///
/// Insertion order is chronological: the initial attempt, then redirect
/// hops, then timeout retries. Never reordered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttemptHistory {
    attempts: Vec<Attempt>,
}

impl AttemptHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt
    pub(crate) fn push(&mut self, attempt: Attempt) {
        self.attempts.push(attempt);
    }

    /// The final attempt, which carries the outcome of the logical call
    pub fn last(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    /// Number of physical attempts made
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Iterate over attempts in chronological order
    pub fn iter(&self) -> std::slice::Iter<'_, Attempt> {
        self.attempts.iter()
    }
}

impl std::ops::Deref for AttemptHistory {
    type Target = [Attempt];

    fn deref(&self) -> &Self::Target {
        &self.attempts
    }
}

impl IntoIterator for AttemptHistory {
    type Item = Attempt;
    type IntoIter = std::vec::IntoIter<Attempt>;

    fn into_iter(self) -> Self::IntoIter {
        self.attempts.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttemptHistory {
    type Item = &'a Attempt;
    type IntoIter = std::slice::Iter<'a, Attempt>;

    fn into_iter(self) -> Self::IntoIter {
        self.attempts.iter()
    }
}

impl fmt::Display for AttemptHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attempt) in self.attempts.iter().enumerate() {
            writeln!(f, "#{} {}", i + 1, attempt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending() -> Attempt {
        let parsed = NormalizedUrl::parse("http://example.com/a?n=1", false).unwrap();
        Attempt::pending(&parsed, "GET", HeaderTable::new(), None, Utc::now())
    }

    #[test]
    fn test_payload_serialization() {
        let p: Payload = json!({"a": 1}).into();
        assert_eq!(p.to_body_string(), r#"{"a":1}"#);
        let p: Payload = "raw text".into();
        assert_eq!(p.to_body_string(), "raw text");
    }

    #[test]
    fn test_pending_attempt() {
        let a = pending();
        assert_eq!(a.status, 0);
        assert!(a.res.content.is_none());
        assert!(!a.is_secure);
        assert!(a.req.query.contains("n"));
    }

    #[test]
    fn test_resolve_timeout() {
        let a = pending().resolve_timeout(
            Duration::from_millis(8000),
            "http://example.com/a",
        );
        assert!(a.is_timeout());
        assert!(a.status_message.contains("8000 ms"));
        assert!(a.status_message.contains("http://example.com/a"));
        assert!(a.time.duration_secs.is_some());
    }

    #[test]
    fn test_resolve_response() {
        let a = pending().resolve_response(
            200,
            "OK".to_string(),
            "1.1".to_string(),
            true,
            HeaderTable::new(),
            Content::Json(json!({"a": 1})),
        );
        assert!(a.is_success());
        assert!(a.decompressed);
        assert_eq!(a.res.content.as_ref().unwrap().as_json().unwrap()["a"], 1);
    }

    #[test]
    fn test_redirect_predicate() {
        let a = pending().resolve_response(
            301,
            "Moved Permanently".to_string(),
            "1.1".to_string(),
            false,
            HeaderTable::new(),
            Content::Text(String::new()),
        );
        assert!(a.is_redirect());
        assert!(!a.is_success());
    }

    #[test]
    fn test_history_order() {
        let mut history = AttemptHistory::new();
        history.push(pending().resolve_failure(400, "first".to_string()));
        history.push(pending().resolve_failure(408, "second".to_string()));
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status_message, "first");
        assert_eq!(history.last().unwrap().status_message, "second");
    }

    #[test]
    fn test_display() {
        let a = pending().resolve_failure(400, "Bad Request".to_string());
        let s = a.to_string();
        assert!(s.contains("GET http://example.com/a?n=1 -> 400 Bad Request"));
    }
}
