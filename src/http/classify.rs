// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport error classification
//!
//! Maps low-level transport failures to the normalized status/message pairs
//! that go into synthetic attempts. The bracketed tokens (`ENOTFOUND`,
//! `ECONNREFUSED`, ...) are kept stable so log greps keep working across
//! client versions.

use std::error::Error as StdError;
use std::io;

use reqwest::StatusCode;

/// Recognized transport failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportClass {
    /// DNS lookup failed
    HostNotFound,
    /// Connection actively refused
    ConnectionRefused,
    /// Connection reset mid-flight
    ConnectionReset,
    /// TLS certificate does not match the host name
    TlsNameMismatch,
    /// Anything else
    Other,
}

/// Classify a transport error into a normalized `(status, message)` pair
pub(crate) fn classify(error: &reqwest::Error, url: &str) -> (u16, String) {
    match transport_class(error) {
        TransportClass::HostNotFound => {
            (404, format!("404 Bad Request [ENOTFOUND] {}", url))
        }
        TransportClass::ConnectionRefused => {
            (400, format!("400 Bad Request [ECONNREFUSED] {}", url))
        }
        TransportClass::ConnectionReset => {
            (500, format!("500 No Server Response [ECONNRESET] {}", url))
        }
        TransportClass::TlsNameMismatch => (
            400,
            format!(
                "400 Bad Request [ERR_TLS_CERT_ALTNAME_INVALID] {}",
                root_message(error)
            ),
        ),
        TransportClass::Other => {
            if error.status() == Some(StatusCode::NOT_FOUND) {
                (404, format!("404 Not Found {}", url))
            } else {
                let status = error.status().map(|s| s.as_u16()).unwrap_or(400);
                (status, error.to_string())
            }
        }
    }
}

/// Walk the error source chain and pick the most specific category
pub(crate) fn transport_class(error: &(dyn StdError + 'static)) -> TransportClass {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return TransportClass::ConnectionRefused,
                io::ErrorKind::ConnectionReset | io::ErrorKind::BrokenPipe => {
                    return TransportClass::ConnectionReset
                }
                _ => {}
            }
        }

        let message = err.to_string();
        if let Some(class) = class_from_message(&message) {
            return class;
        }

        current = err.source();
    }
    TransportClass::Other
}

/// Recognize categories that only show up as message text (DNS resolution
/// and rustls certificate validation do not expose typed errors through
/// the reqwest source chain)
fn class_from_message(message: &str) -> Option<TransportClass> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("dns error") || lower.contains("failed to lookup address") {
        return Some(TransportClass::HostNotFound);
    }
    if lower.contains("notvalidforname") || lower.contains("hostname mismatch") {
        return Some(TransportClass::TlsNameMismatch);
    }
    if lower.contains("connection refused") {
        return Some(TransportClass::ConnectionRefused);
    }
    if lower.contains("connection reset") {
        return Some(TransportClass::ConnectionReset);
    }
    None
}

/// Innermost message in the source chain, used as the TLS mismatch reason
fn root_message(error: &(dyn StdError + 'static)) -> String {
    let mut current: &(dyn StdError + 'static) = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    /// Wrapper mimicking reqwest's layered errors
    #[derive(Debug)]
    struct Layered {
        message: &'static str,
        source: Option<Box<dyn StdError + 'static>>,
    }

    impl fmt::Display for Layered {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl StdError for Layered {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref()
        }
    }

    fn wrap(message: &'static str, inner: io::Error) -> Layered {
        Layered {
            message,
            source: Some(Box::new(inner)),
        }
    }

    #[test]
    fn test_connection_refused() {
        let err = wrap(
            "error sending request",
            io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        );
        assert_eq!(transport_class(&err), TransportClass::ConnectionRefused);
    }

    #[test]
    fn test_connection_reset() {
        let err = wrap(
            "error sending request",
            io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"),
        );
        assert_eq!(transport_class(&err), TransportClass::ConnectionReset);
    }

    #[test]
    fn test_dns_failure_from_message() {
        let err = wrap(
            "error sending request",
            io::Error::new(
                io::ErrorKind::Other,
                "dns error: failed to lookup address information",
            ),
        );
        assert_eq!(transport_class(&err), TransportClass::HostNotFound);
    }

    #[test]
    fn test_tls_name_mismatch_from_message() {
        let err = wrap(
            "error sending request",
            io::Error::new(
                io::ErrorKind::InvalidData,
                "invalid peer certificate: CertNotValidForName",
            ),
        );
        assert_eq!(transport_class(&err), TransportClass::TlsNameMismatch);
    }

    #[test]
    fn test_unknown_is_other() {
        let err = Layered {
            message: "something else entirely",
            source: None,
        };
        assert_eq!(transport_class(&err), TransportClass::Other);
    }

    #[test]
    fn test_root_message() {
        let err = wrap(
            "outer",
            io::Error::new(io::ErrorKind::InvalidData, "inner detail"),
        );
        assert_eq!(root_message(&err), "inner detail");
    }
}
