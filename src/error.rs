// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the mustekala HTTP client
//!
//! Ordinary HTTP failure modes (4xx/5xx, timeouts, refused connections) are
//! reported in-band as [`Attempt`](crate::http::Attempt) records and never
//! surface here. This module covers client misuse and construction failures.

use thiserror::Error;

/// Result type alias for mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the mustekala HTTP client
#[derive(Error, Debug)]
pub enum Error {
    /// URL was empty, malformed, or failed parsing after correction
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request body string was not valid JSON (from `ask_json`)
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// HTTP transport failed outside the attempt state machine
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid-URL error
    pub fn invalid_url<S: Into<String>>(msg: S) -> Self {
        Error::InvalidUrl(msg.into())
    }

    /// Create an invalid-body error
    pub fn invalid_body<S: Into<String>>(msg: S) -> Self {
        Error::InvalidBody(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an invalid-URL error
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Error::InvalidUrl(_))
    }

    /// Check if this is an invalid-body error
    pub fn is_invalid_body(&self) -> bool {
        matches!(self, Error::InvalidBody(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_error() {
        let err = Error::invalid_url("URL is not defined");
        assert!(err.is_invalid_url());
        assert_eq!(err.to_string(), "Invalid URL: URL is not defined");
    }

    #[test]
    fn test_invalid_body_error() {
        let err = Error::invalid_body("body string is not valid JSON");
        assert!(err.is_invalid_body());
        assert!(!err.is_invalid_url());
    }

    #[test]
    fn test_from_str() {
        let err: Error = "something broke".into();
        assert_eq!(err.to_string(), "something broke");
    }
}
