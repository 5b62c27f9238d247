//! Cache storage traits.
//!
//! `CacheStorage` is the collection of named stores; `CacheStore` is one
//! named store mapping requests to responses. The worker is written against
//! these traits only.

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// A collection of named cache stores.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    type Store: CacheStore;

    /// Open the store with this name, creating it if absent.
    async fn open(&self, name: &str) -> Result<Self::Store, Error>;

    /// Whether a store with this name exists.
    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Names of all existing stores, in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had this name.
    async fn delete(&self, name: &str) -> Result<bool, Error>;
}

/// One named request -> response store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Name of this store.
    fn name(&self) -> &str;

    /// Find the stored response for a request (method + URL match).
    async fn lookup(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Store a response, replacing any previous entry for the same key.
    async fn put(&self, request: &Request, response: &Response) -> Result<(), Error>;

    /// Store several entries atomically: either all are written or none.
    async fn put_all(&self, entries: &[(Request, Response)]) -> Result<(), Error>;

    /// Requests with a stored entry, ordered by URL. Headers are not kept.
    async fn keys(&self) -> Result<Vec<Request>, Error>;

    /// Remove the entry for a request. Returns false if there was none.
    async fn delete(&self, request: &Request) -> Result<bool, Error>;

    /// Number of entries.
    async fn count(&self) -> Result<usize, Error>;
}
