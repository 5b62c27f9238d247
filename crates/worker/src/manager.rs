//! Cache-first offline cache manager.

use async_trait::async_trait;
use futures_util::future::{join_all, try_join_all};
use shellcache_client::Network;
use shellcache_core::{CacheStorage, CacheStore, Error, Generation, Request, Response};

use crate::lifecycle::{ActivationReport, FetchOutcome, InstallReport, Lifecycle};

/// Fetch every request and store all responses in one write.
///
/// Fails without writing anything if any fetch fails or returns a non-2xx
/// status. Returns the number of entries stored.
pub async fn add_all<St, N>(store: &St, network: &N, requests: Vec<Request>) -> Result<usize, Error>
where
    St: CacheStore + ?Sized,
    N: Network + ?Sized,
{
    let responses = try_join_all(requests.iter().map(|request| async move {
        let response = network.fetch(request).await?;
        if !response.is_success() {
            return Err(Error::BadStatus { url: request.url.to_string(), status: response.status });
        }
        Ok::<Response, Error>(response)
    }))
    .await?;

    let entries: Vec<(Request, Response)> = requests.into_iter().zip(responses).collect();
    store.put_all(&entries).await?;

    Ok(entries.len())
}

/// Offline cache manager for one cache generation.
///
/// Keeps exactly one store (named by the generation) populated with the app
/// shell, removes the stores of other generations, and serves requests
/// cache-first.
pub struct OfflineCacheManager<S, N> {
    generation: Generation,
    storage: S,
    network: N,
}

impl<S: CacheStorage, N: Network> OfflineCacheManager<S, N> {
    /// Create a manager for `generation` on top of a storage and a network.
    pub fn new(generation: Generation, storage: S, network: N) -> Self {
        Self { generation, storage, network }
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Open the current store for fetch handling.
    ///
    /// An open failure only costs the caching; the request still goes out.
    async fn current_store(&self) -> Option<S::Store> {
        match self.storage.open(self.generation.cache_name()).await {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(cache = self.generation.cache_name(), error = %e, "cannot open cache store");
                None
            }
        }
    }
}

#[async_trait]
impl<S: CacheStorage, N: Network> Lifecycle for OfflineCacheManager<S, N> {
    fn cache_name(&self) -> &str {
        self.generation.cache_name()
    }

    async fn install(&self) -> Result<InstallReport, Error> {
        let cache_name = self.generation.cache_name();
        tracing::debug!(cache = cache_name, "install");

        let result: Result<usize, Error> = async {
            let requests = self.generation.asset_requests()?;
            let store = self.storage.open(cache_name).await?;
            tracing::debug!(cache = cache_name, assets = requests.len(), "caching all: app shell and content");
            add_all(&store, &self.network, requests).await
        }
        .await;

        match result {
            Ok(stored) => {
                tracing::info!(cache = cache_name, stored, "installed");
                Ok(InstallReport { cache_name: cache_name.to_string(), stored })
            }
            Err(e) => {
                tracing::warn!(cache = cache_name, error = %e, "install failed");
                Err(Error::InstallFailed { cache_name: cache_name.to_string(), source: Box::new(e) })
            }
        }
    }

    async fn activate(&self) -> Result<ActivationReport, Error> {
        tracing::debug!(cache = self.generation.cache_name(), "clearing old caches");

        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| !self.generation.is_current(name))
            .collect();

        let results = join_all(stale.iter().map(|name| self.storage.delete(name))).await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(true) => deleted.push(name),
                Ok(false) => tracing::debug!(cache = %name, "stale cache already gone"),
                Err(e) => {
                    tracing::warn!(cache = %name, error = %e, "failed to delete stale cache");
                    failed.push(name);
                }
            }
        }

        if !failed.is_empty() {
            return Err(Error::ActivationFailed { failed });
        }

        tracing::info!(cache = self.generation.cache_name(), deleted = deleted.len(), "activated");
        Ok(ActivationReport { kept: self.generation.cache_name().to_string(), deleted })
    }

    async fn fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let store = self.current_store().await;

        if let Some(store) = &store {
            match store.lookup(request).await {
                Ok(Some(response)) => {
                    tracing::debug!(method = %request.method, url = %request.url, "fetching resource: cache hit");
                    return Ok(FetchOutcome::from_cache(response));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(url = %request.url, error = %e, "cache lookup failed"),
            }
        }

        tracing::debug!(method = %request.method, url = %request.url, "fetching resource: network");
        let response = self.network.fetch(request).await?;

        if let Some(store) = &store {
            tracing::debug!(url = %request.url, "caching new resource");
            if let Err(e) = store.put(request, &response).await {
                tracing::warn!(url = %request.url, error = %e, "failed to cache resource");
            }
        }

        Ok(FetchOutcome::from_network(response))
    }
}
