// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL normalization
//!
//! Corrects a raw URL string (missing scheme, stray whitespace) into a
//! well-formed absolute URL and splits it into its parts. Every attempt
//! starts from a [`NormalizedUrl`]; a partially populated one cannot exist.

use url::Url;

use super::query::QueryMap;
use crate::error::{Error, Result};

/// A corrected, fully parsed absolute URL
#[derive(Debug, Clone)]
pub struct NormalizedUrl {
    /// The corrected URL
    pub url: Url,
    /// Scheme without the trailing colon (`http` / `https`)
    pub scheme: String,
    /// Host name without port
    pub hostname: String,
    /// Explicit port, or the scheme default (80/443)
    pub port: u16,
    /// Path component, `/` when absent
    pub path: String,
    /// Raw query string without the leading `?`, empty when absent
    pub query_string: String,
    /// Typed query mapping decoded from `query_string`
    pub query: QueryMap,
    /// Whether the scheme is `https`
    pub is_secure: bool,
}

impl NormalizedUrl {
    /// Correct and parse a raw URL string.
    ///
    /// Correction steps: trim, prepend `http://` when no `http(s)://`
    /// prefix, then either percent-encode the whole string (`encode_uri`)
    /// or collapse whitespace runs and encode the spaces as `%20`.
    pub fn parse(raw: &str, encode_uri: bool) -> Result<Self> {
        let corrected = correct_url(raw, encode_uri)?;
        let url = Url::parse(&corrected).map_err(|err| {
            Error::invalid_url(format!("{} ({})", corrected, err))
        })?;

        let scheme = url.scheme().to_string();
        if scheme != "http" && scheme != "https" {
            return Err(Error::invalid_url(format!(
                "unsupported scheme '{}' in {}",
                scheme, corrected
            )));
        }
        let hostname = url
            .host_str()
            .ok_or_else(|| Error::invalid_url(format!("no host in {}", corrected)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::invalid_url(format!("no port in {}", corrected)))?;
        let query_string = url.query().unwrap_or("").to_string();

        Ok(Self {
            scheme: scheme.clone(),
            hostname,
            port,
            path: url.path().to_string(),
            query: QueryMap::decode(&query_string, encode_uri),
            query_string,
            is_secure: scheme == "https",
            url,
        })
    }

    /// `hostname:port` pair
    pub fn host(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }

    /// The corrected URL as a string
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Path plus query string, the request target sent on the wire
    pub fn path_and_query(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }
}

/// Apply URL corrections before parsing
fn correct_url(raw: &str, encode_uri: bool) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_url("URL is not defined"));
    }

    let mut url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    if encode_uri {
        url = encode_uri_string(&url);
    } else {
        url = collapse_whitespace(&url).replace(' ', "%20");
    }

    Ok(url)
}

/// Collapse internal whitespace runs to a single space
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Percent-encode a whole URL, leaving URI structure characters intact.
///
/// Matches the ECMAScript `encodeURI` unreserved set, with `%` also kept
/// so already-encoded input passes through unchanged.
fn encode_uri_string(s: &str) -> String {
    const KEEP: &[u8] = b";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() || KEEP.contains(&byte) || byte == b'%' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::query::QueryValue;

    #[test]
    fn test_scheme_prepended() {
        let u = NormalizedUrl::parse("example.com/path", false).unwrap();
        assert_eq!(u.scheme, "http");
        assert_eq!(u.as_str(), "http://example.com/path");
    }

    #[test]
    fn test_existing_scheme_kept() {
        let u = NormalizedUrl::parse("https://example.com", false).unwrap();
        assert_eq!(u.scheme, "https");
        assert!(u.is_secure);
    }

    #[test]
    fn test_whitespace_trimmed_and_encoded() {
        let u = NormalizedUrl::parse("  example.com/a   b  ", false).unwrap();
        assert_eq!(u.path, "/a%20b");
    }

    #[test]
    fn test_default_ports() {
        let http = NormalizedUrl::parse("http://example.com", false).unwrap();
        let https = NormalizedUrl::parse("https://example.com", false).unwrap();
        assert_eq!(http.port, 80);
        assert_eq!(https.port, 443);
        assert_eq!(http.host(), "example.com:80");
    }

    #[test]
    fn test_explicit_port() {
        let u = NormalizedUrl::parse("http://localhost:8001/www/products", false).unwrap();
        assert_eq!(u.port, 8001);
        assert_eq!(u.hostname, "localhost");
        assert_eq!(u.path, "/www/products");
    }

    #[test]
    fn test_query_extraction() {
        let u = NormalizedUrl::parse("localhost:8001/p?category=databases&n=3", false).unwrap();
        assert_eq!(u.query_string, "category=databases&n=3");
        assert_eq!(u.query.get("n"), Some(&QueryValue::Int(3)));
        assert_eq!(u.path_and_query(), "/p?category=databases&n=3");
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(NormalizedUrl::parse("", false).is_err());
        assert!(NormalizedUrl::parse("   ", false).is_err());
    }

    #[test]
    fn test_hostless_url_rejected() {
        assert!(NormalizedUrl::parse("http://", false).is_err());
    }

    #[test]
    fn test_idempotent() {
        let once = NormalizedUrl::parse("  example.com/a b?x=1 ", false).unwrap();
        let twice = NormalizedUrl::parse(once.as_str(), false).unwrap();
        assert_eq!(once.as_str(), twice.as_str());
    }

    #[test]
    fn test_encode_uri_mode() {
        let u = NormalizedUrl::parse("example.com/päivä", true).unwrap();
        assert_eq!(u.path, "/p%C3%A4iv%C3%A4");
    }

    #[test]
    fn test_collapse_whitespace_helper() {
        assert_eq!(collapse_whitespace("a  b\t\tc"), "a b c");
    }
}
