//! Network access for the offline cache manager.
//!
//! ### Network trait
//! - The worker only talks to the network through [`Network`], so hosts and
//!   tests can substitute their own transport.
//!
//! ### HTTP semantics
//! - Any HTTP status is a response, not an error; only transport failures,
//!   timeouts and oversized bodies fail.
//! - Max redirects: 5
//! - Max body bytes: configurable, checked while streaming

pub mod url;

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::{Client, Method};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

use shellcache_core::{Error, Request, Response};

/// A network fetch capability.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request and return whatever the server answered.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 20MB)
    pub max_bytes: usize,

    /// Request timeout (default: 30s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("shellcache/", env!("CARGO_PKG_VERSION")).to_string(),
            max_bytes: 20 * 1024 * 1024,
            timeout: Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

impl From<&shellcache_core::AppConfig> for FetchConfig {
    fn from(config: &shellcache_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(url.to_string()) } else { Error::Network(format!("{url}: {err}")) }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let url = request.url.as_str();

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.send().await.map_err(|e| transport_error(url, e))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| transport_error(url, e))? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(Error::FetchTooLarge(format!("{url}: body exceeds {}", self.config.max_bytes)));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.freeze(),
            url: Some(final_url),
        })
    }
}
