// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer for mustekala
//!
//! One logical request becomes an ordered history of physical attempts:
//! the initial request, any followed redirects, then any timeout retries.
//! Timeouts and transport errors resolve in-band as synthetic attempts
//! instead of surfacing as errors.

mod attempt;
mod classify;
mod client;
mod headers;
mod query;
mod url;

pub use attempt::{
    Attempt, AttemptHistory, AttemptTiming, Content, Payload, RequestRecord,
    ResponseRecord,
};
pub use client::{Asker, HttpClient, HttpClientConfig};
pub use headers::HeaderTable;
pub use query::{QueryMap, QueryValue};
pub use url::NormalizedUrl;

// reqwest types that appear in the public API
pub use reqwest::{Method, StatusCode};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!(
    "mustekala/",
    env!("CARGO_PKG_VERSION"),
    " https://github.com/bountyyfi/mustekala"
);

/// Common HTTP header names
pub mod header_names {
    pub const ACCEPT: &str = "accept";
    pub const ACCEPT_ENCODING: &str = "accept-encoding";
    pub const AUTHORIZATION: &str = "authorization";
    pub const CACHE_CONTROL: &str = "cache-control";
    pub const CONNECTION: &str = "connection";
    pub const CONTENT_ENCODING: &str = "content-encoding";
    pub const CONTENT_LENGTH: &str = "content-length";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const HOST: &str = "host";
    pub const LOCATION: &str = "location";
    pub const USER_AGENT: &str = "user-agent";
}
