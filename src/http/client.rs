// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! [`HttpClient::ask_once`] is the single-attempt executor: exactly one
//! physical request/response cycle, resolved into an [`Attempt`] on every
//! path (response, timeout, transport error). [`HttpClient::ask`] is the
//! orchestrator that drives it through redirect and timeout-retry loops.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::Utc;
use encoding_rs::Encoding;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use parking_lot::RwLock;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Version};
use url::Url;

use super::attempt::{Attempt, AttemptHistory, Content, Payload};
use super::classify::classify;
use super::header_names;
use super::headers::HeaderTable;
use super::url::NormalizedUrl;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
///
/// Options are validated and defaulted at construction and never mutated by
/// requests. The default header set lives here immutably; mutable per-client
/// overrides are kept separately on the client (see `set_headers`).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Percent-encode the whole URL instead of only encoding spaces
    pub encode_uri: bool,
    /// Text encoding label for bodies ("utf8"; "binary" for byte-faithful)
    pub encoding: String,
    /// Per-attempt timeout, for both awaiting the response and reading it
    pub timeout: Duration,
    /// How many times a 408 attempt is retried
    pub retry: u32,
    /// Delay between timeout retries
    pub retry_delay: Duration,
    /// Maximum 3xx redirects followed
    pub max_redirects: u32,
    /// Attempt decompression even without a content-encoding header
    pub decompress: bool,
    /// Log parsed-URL fields per attempt
    pub debug: bool,
    /// Proxy URL; the proxied connection takes precedence over direct ones
    pub proxy: Option<String>,
    /// Default headers copied into every attempt
    pub default_headers: HeaderTable,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderTable::new();
        default_headers.set(header_names::USER_AGENT, DEFAULT_USER_AGENT);
        default_headers.set(header_names::ACCEPT, "*/*");
        default_headers.set(header_names::CACHE_CONTROL, "no-cache");
        default_headers.set(header_names::ACCEPT_ENCODING, "gzip");
        default_headers.set(header_names::CONNECTION, "close");
        default_headers.set(header_names::CONTENT_TYPE, "text/html; charset=UTF-8");

        Self {
            encode_uri: false,
            encoding: "utf8".to_string(),
            timeout: Duration::from_millis(8000),
            retry: 3,
            retry_delay: Duration::from_millis(5500),
            max_redirects: 3,
            decompress: false,
            debug: false,
            proxy: None,
            default_headers,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set URL percent-encoding mode
    pub fn encode_uri(mut self, encode_uri: bool) -> Self {
        self.encode_uri = encode_uri;
        self
    }

    /// Set the body text encoding label
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout retry limit
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Set the delay between timeout retries
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Set the redirect limit
    pub fn max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Set opportunistic decompression
    pub fn decompress(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }

    /// Set debug logging of parsed URLs
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the proxy URL
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set (add/update) a default header
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }
}

/// Attempt-oriented HTTP client
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    /// Per-client header overrides, merged over the config defaults for
    /// every attempt. The only shared mutable state per client; callers
    /// needing isolation use separate client instances.
    overrides: Arc<RwLock<HeaderTable>>,
}

impl HttpClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        // Redirects, timeouts and decompression belong to the attempt state
        // machine, not to reqwest. No idle pooling: the connection is torn
        // down when the attempt's response is dropped, on every exit path.
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            config,
            overrides: Arc::new(RwLock::new(HeaderTable::new())),
        })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Shallow-merge headers into the per-client override table
    pub fn set_headers<I, K, V>(&self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.overrides.write().set_all(headers);
    }

    /// Set (add/update) one header in the override table
    pub fn set_header(&self, name: impl AsRef<str>, value: impl Into<String>) {
        self.overrides.write().set(name, value);
    }

    /// Delete headers from the override table, case-insensitively
    pub fn del_headers(&self, names: &[&str]) {
        self.overrides.write().delete(names);
    }

    /// Snapshot of the active headers: defaults merged with overrides
    pub fn get_headers(&self) -> HeaderTable {
        self.config.default_headers.merged(&self.overrides.read())
    }

    /// Issue a GET request with full redirect/retry orchestration
    pub async fn get(&self, url: &str) -> AttemptHistory {
        self.ask(url, Method::GET, None).await
    }

    /// Issue a POST request with full redirect/retry orchestration
    pub async fn post(&self, url: &str, body: impl Into<Payload>) -> AttemptHistory {
        self.ask(url, Method::POST, Some(body.into())).await
    }

    /// Perform exactly one physical request/response cycle.
    ///
    /// Never returns an error: bad URLs, timeouts and transport failures
    /// all resolve into synthetic attempts with the appropriate status
    /// (400 / 408 / classified). Redirects are not followed.
    pub async fn ask_once(
        &self,
        url: &str,
        method: Method,
        body: Option<Payload>,
    ) -> Attempt {
        self.ask_once_with(url, method, body, None).await
    }

    /// `ask_once` with extra per-call headers merged over the snapshot.
    /// Used by `ask_json` so forcing JSON headers for one call does not
    /// leak into the client's override table.
    async fn ask_once_with(
        &self,
        url: &str,
        method: Method,
        body: Option<Payload>,
        extra_headers: Option<&HeaderTable>,
    ) -> Attempt {
        let request_at = Utc::now();
        let mut headers = self.get_headers();
        if let Some(extra) = extra_headers {
            headers.set_all(extra.iter());
        }

        let parsed = match NormalizedUrl::parse(url, self.config.encode_uri) {
            Ok(parsed) => parsed,
            Err(err) => {
                // no physical request for an uncorrectable URL
                return Attempt::unparsed(url, method.as_str(), headers, body, request_at)
                    .resolve_failure(400, err.to_string());
            }
        };

        if self.config.debug {
            tracing::debug!(
                url = %parsed.as_str(),
                scheme = %parsed.scheme,
                hostname = %parsed.hostname,
                port = parsed.port,
                path = %parsed.path,
                query = %parsed.query_string,
                "parsed url"
            );
        }

        // body serialization; a stale content-length must not survive on
        // bodyless methods
        let mut body_bytes: Option<Vec<u8>> = None;
        if method_allows_body(&method) {
            if let Some(ref payload) = body {
                let text = payload.to_body_string();
                let bytes = encode_text(&text, &self.config.encoding);
                headers.set(header_names::CONTENT_LENGTH, bytes.len().to_string());
                body_bytes = Some(bytes);
            }
        } else {
            headers.delete(&[header_names::CONTENT_LENGTH]);
        }

        let attempt = Attempt::pending(
            &parsed,
            method.as_str(),
            headers.clone(),
            body,
            request_at,
        );

        let mut builder = self
            .client
            .request(method, parsed.url.clone())
            .headers(headers.to_header_map());
        if let Some(bytes) = body_bytes {
            builder = builder.body(bytes);
        }

        // await the response head, bounded by the attempt timeout
        let mut response =
            match tokio::time::timeout(self.config.timeout, builder.send()).await {
                Err(_) => {
                    return attempt.resolve_timeout(self.config.timeout, parsed.as_str())
                }
                Ok(Err(err)) => {
                    let (status, message) = classify(&err, parsed.as_str());
                    return attempt.resolve_failure(status, message);
                }
                Ok(Ok(response)) => response,
            };

        let status = response.status();
        let version = response.version();
        let res_headers = HeaderTable::from_header_map(response.headers());

        // Accumulate the body racing a deadline. Servers holding keep-alive
        // connections may never signal end-of-body, so the first of the two
        // finalizes the attempt; the single-exit loop is the one-shot latch.
        let mut buf = BytesMut::new();
        let mut transport_failure: Option<(u16, String)> = None;
        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                chunk = response.chunk() => match chunk {
                    Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
                    Ok(None) => break,
                    Err(err) => {
                        transport_failure = Some(classify(&err, parsed.as_str()));
                        break;
                    }
                },
                _ = &mut deadline => break,
            }
        }
        // teardown: with no idle pooling the socket dies here
        drop(response);

        let (bytes, decompressed) = decompress_body(
            buf.to_vec(),
            res_headers.get(header_names::CONTENT_ENCODING),
            self.config.decompress,
            parsed.as_str(),
        );
        let text = decode_text(&bytes, &self.config.encoding);
        let content = coerce_json(text);

        let (final_status, status_message) = match transport_failure {
            Some((status, message)) => (status, message),
            None => (
                status.as_u16(),
                status.canonical_reason().unwrap_or("").to_string(),
            ),
        };

        attempt.resolve_response(
            final_status,
            status_message,
            version_label(version).to_string(),
            decompressed,
            res_headers,
            content,
        )
    }

    /// Issue a request with full orchestration: follow 3xx redirects up to
    /// `max_redirects`, then retry 408 timeouts up to `retry` times.
    ///
    /// Returns the ordered attempt history: the initial attempt, redirect
    /// hops, then timeout retries. The final attempt carries the outcome.
    pub async fn ask(
        &self,
        url: &str,
        method: Method,
        body: Option<Payload>,
    ) -> AttemptHistory {
        let mut history = AttemptHistory::new();
        let mut answer = self.ask_once(url, method.clone(), body.clone()).await;

        // redirect targets resolve against the original corrected URL;
        // exhausting the limit leaves the last 3xx as the final answer
        let base_url = answer.url.clone();
        let mut redirects = 0;
        while answer.is_redirect() && redirects < self.config.max_redirects {
            redirects += 1;
            let location = answer
                .res
                .headers
                .get(header_names::LOCATION)
                .unwrap_or("")
                .to_string();
            let target = resolve_redirect(&base_url, &location);
            tracing::info!(
                hop = redirects,
                status = answer.status,
                from = %answer.url,
                to = %target,
                "following redirect"
            );
            history.push(answer);
            answer = self.ask_once(&target, method.clone(), body.clone()).await;
        }

        // retries reissue the original request, not a redirected one, and
        // only fire once the redirect phase has settled
        let mut retries = 0;
        while answer.is_timeout() && retries < self.config.retry {
            retries += 1;
            tracing::info!(
                retry = retries,
                timeout_ms = self.config.timeout.as_millis() as u64,
                url = %url,
                "retrying after timeout"
            );
            tokio::time::sleep(self.config.retry_delay).await;
            history.push(answer);
            answer = self.ask_once(url, method.clone(), body.clone()).await;
        }

        history.push(answer);
        history
    }

    /// Single attempt with JSON semantics: forces JSON request headers for
    /// this call only and parses string bodies as JSON.
    ///
    /// The only ask-family operation that can fail: a string body that is
    /// not valid JSON returns [`Error::InvalidBody`].
    pub async fn ask_json(
        &self,
        url: &str,
        method: Method,
        body: Option<Payload>,
    ) -> Result<Attempt> {
        let body = match body {
            Some(Payload::Text(text)) => {
                let value: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|err| {
                        Error::invalid_body(format!(
                            "body string is not valid JSON: {}",
                            err
                        ))
                    })?;
                Some(Payload::Json(value))
            }
            other => other,
        };

        let mut json_headers = HeaderTable::new();
        json_headers.set(header_names::CONTENT_TYPE, "application/json; charset=utf-8");
        json_headers.set(header_names::ACCEPT, "application/json");

        Ok(self.ask_once_with(url, method, body, Some(&json_headers)).await)
    }

    /// Issue several logical GET requests concurrently, one history each
    pub async fn ask_all(&self, urls: &[&str]) -> Vec<AttemptHistory> {
        let futures: Vec<_> = urls
            .iter()
            .map(|url| self.ask(url, Method::GET, None))
            .collect();
        futures::future::join_all(futures).await
    }

    /// Escape hatch: send the request and hand back the live response for
    /// direct pipe-through (`bytes_stream`), bypassing the attempt state
    /// machine entirely. No redirect following, retries or decompression.
    pub async fn grab_stream(
        &self,
        url: &str,
        method: Method,
        body: Option<Payload>,
    ) -> Result<reqwest::Response> {
        let parsed = NormalizedUrl::parse(url, self.config.encode_uri)?;
        let mut headers = self.get_headers();

        let mut body_bytes: Option<Vec<u8>> = None;
        if method_allows_body(&method) {
            if let Some(payload) = body {
                let bytes = encode_text(&payload.to_body_string(), &self.config.encoding);
                headers.set(header_names::CONTENT_LENGTH, bytes.len().to_string());
                body_bytes = Some(bytes);
            }
        } else {
            headers.delete(&[header_names::CONTENT_LENGTH]);
        }

        let mut builder = self
            .client
            .request(method, parsed.url.clone())
            .headers(headers.to_header_map());
        if let Some(bytes) = body_bytes {
            builder = builder.body(bytes);
        }

        Ok(builder.send().await?)
    }
}

/// Collaborator seam: anything that can turn a URL into an attempt history.
///
/// Peripheral consumers (robots.txt fetchers, crawlers) depend on this
/// trait and read `history.last()` content as text instead of binding to
/// the concrete client.
#[async_trait]
pub trait Asker: Send + Sync {
    /// Issue a GET request with full orchestration
    async fn ask(&self, url: &str) -> AttemptHistory;
}

#[async_trait]
impl Asker for HttpClient {
    async fn ask(&self, url: &str) -> AttemptHistory {
        HttpClient::ask(self, url, Method::GET, None).await
    }
}

/// GET requests never carry a payload; every other method does
fn method_allows_body(method: &Method) -> bool {
    *method != Method::GET
}

/// Resolve a `location` header against the original request URL,
/// supporting both relative and absolute targets
fn resolve_redirect(base: &str, location: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(location)) {
        Ok(url) => url.to_string(),
        Err(_) => location.to_string(),
    }
}

/// Map an encoding label to an `encoding_rs` encoding. "binary" keeps the
/// Latin-1 byte-to-char identity so binary bodies survive a text round-trip.
fn resolve_encoding(label: &str) -> &'static Encoding {
    match label {
        "binary" | "latin1" => encoding_rs::WINDOWS_1252,
        other => Encoding::for_label(other.as_bytes()).unwrap_or(encoding_rs::UTF_8),
    }
}

/// Encode body text with the configured encoding
fn encode_text(text: &str, label: &str) -> Vec<u8> {
    let (bytes, _, _) = resolve_encoding(label).encode(text);
    bytes.into_owned()
}

/// Decode response bytes with the configured encoding
fn decode_text(bytes: &[u8], label: &str) -> String {
    let (text, _, _) = resolve_encoding(label).decode(bytes);
    text.into_owned()
}

/// Decompress a response body per its `content-encoding`, or by sniffing
/// when `opportunistic` is set and the header is absent.
///
/// Returns the bytes and whether the body counts as decompressed. A body
/// that claims a compressed encoding counts even when decompression fails;
/// the raw buffer is passed through with a warning in that case.
fn decompress_body(
    buf: Vec<u8>,
    content_encoding: Option<&str>,
    opportunistic: bool,
    url: &str,
) -> (Vec<u8>, bool) {
    match content_encoding.map(str::trim) {
        Some(enc) if enc.eq_ignore_ascii_case("gzip") => match gunzip(&buf) {
            Ok(out) => (out, true),
            Err(err) => {
                tracing::warn!(%url, error = %err, "gzip decompression failed, passing body through raw");
                (buf, true)
            }
        },
        Some(enc) if enc.eq_ignore_ascii_case("deflate") => match inflate(&buf) {
            Ok(out) => (out, true),
            Err(err) => {
                tracing::warn!(%url, error = %err, "deflate decompression failed, passing body through raw");
                (buf, true)
            }
        },
        _ if opportunistic => sniff_decompress(buf),
        _ => (buf, false),
    }
}

/// Try gzip by magic bytes, then zlib; unrecognized bodies pass through
fn sniff_decompress(buf: Vec<u8>) -> (Vec<u8>, bool) {
    if buf.starts_with(&[0x1f, 0x8b]) {
        if let Ok(out) = gunzip(&buf) {
            return (out, true);
        }
    } else if let Ok(out) = inflate(&buf) {
        return (out, true);
    }
    (buf, false)
}

fn gunzip(buf: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    GzDecoder::new(buf).read_to_end(&mut out)?;
    Ok(out)
}

/// Inflate a deflate body, accepting both zlib-wrapped and raw streams
fn inflate(buf: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    match ZlibDecoder::new(buf).read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) => {
            out.clear();
            DeflateDecoder::new(buf).read_to_end(&mut out)?;
            Ok(out)
        }
    }
}

/// Coerce body text into parsed JSON when it is valid, non-null JSON
fn coerce_json(text: String) -> Content {
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) if !value.is_null() => Content::Json(value),
        _ => Content::Text(text),
    }
}

/// Short HTTP version label, matching what servers report ("1.1", "2.0")
fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_09 {
        "0.9"
    } else if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_11 {
        "1.1"
    } else if version == Version::HTTP_2 {
        "2.0"
    } else if version == Version::HTTP_3 {
        "3.0"
    } else {
        "1.1"
    }
}
