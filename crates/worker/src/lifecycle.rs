//! Lifecycle interface a host drives a worker through.

use async_trait::async_trait;
use shellcache_core::{Error, Request, Response};

/// The three events a host dispatches to a worker.
///
/// Each method resolves once the work it started is done; the host holds its
/// pending transition (or the intercepted request) open until then.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Name of the cache generation this worker owns.
    fn cache_name(&self) -> &str;

    /// Populate the current store with the app shell.
    async fn install(&self) -> Result<InstallReport, Error>;

    /// Remove every store that is not the current one.
    async fn activate(&self) -> Result<ActivationReport, Error>;

    /// Answer an intercepted request.
    async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error>;
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    /// Number of assets written to the store.
    pub stored: usize,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// The store that was kept.
    pub kept: String,
    /// Stale stores that were removed.
    pub deleted: Vec<String>,
}

/// Where a fetch answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Served from the current store, no network call
    Cache,
    /// Fetched from the network
    Network,
}

/// Answer to an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

impl FetchOutcome {
    pub fn from_cache(response: Response) -> Self {
        Self { response, source: ResponseSource::Cache }
    }

    pub fn from_network(response: Response) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    pub fn is_cached(&self) -> bool {
        self.source == ResponseSource::Cache
    }
}
