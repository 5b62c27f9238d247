//! Request and response model shared by the cache, the network client and the worker.

use bytes::Bytes;
use url::Url;

use crate::cache::hash::compute_cache_key;

/// An intercepted outbound resource request.
///
/// The URL is always absolute and never carries a fragment; the method is
/// stored upper-case so `get` and `GET` produce the same cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Create a request with the given method.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// Append a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Cache key for this request (method + URL, headers ignored).
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}

/// A response as returned by the network or read back from a store.
///
/// Cloning is cheap and content-preserving: the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Final URL after redirects, when known.
    pub url: Option<Url>,
}

impl Response {
    /// Create a response with a status and body, no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: String::new(), headers: Vec::new(), body: body.into(), url: None }
    }

    /// Append a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Content-Type header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
