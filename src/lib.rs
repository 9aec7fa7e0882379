// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Attempt-Oriented HTTP Client
//!
//! A lightweight async HTTP client that turns every logical request into an
//! ordered history of physical attempts. Redirect following, timeout
//! retries, header normalization, typed query parsing, body decompression
//! and JSON coercion are all handled by one deterministic state machine.
//!
//! ## Features
//!
//! - Attempt history: one immutable record per physical request, including
//!   synthetic records for timeouts and transport failures
//! - Redirect loop: bounded 3xx following with relative/absolute targets
//! - Retry loop: bounded 408 retries against the original URL
//! - In-band errors: refused connections, DNS failures and resets become
//!   status-coded attempts, never exceptions
//! - URL correction: missing schemes and stray whitespace fixed up front
//! - Typed query parsing: `?n=12&f=12.5&b=true` decodes to typed values
//! - Decompression: gzip/deflate bodies unpacked, opportunistically when
//!   configured
//! - Raw stream escape hatch for pipe-through proxying
//!
//! ## Example
//!
//! ```rust,no_run
//! use mustekala::{HttpClient, Method};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new()?;
//!
//!     let history = client.ask("example.com", Method::GET, None).await;
//!     let answer = history.last().expect("at least one attempt");
//!     println!("{} after {} attempt(s)", answer.status, history.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

// Re-exports for convenience

// Errors
pub use error::{Error, Result};

// HTTP client
pub use http::{
    Asker, Attempt, AttemptHistory, AttemptTiming, Content, HeaderTable, HttpClient,
    HttpClientConfig, Method, NormalizedUrl, Payload, QueryMap, QueryValue, StatusCode,
    DEFAULT_USER_AGENT,
};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
