//! Test doubles for the network and the cache storage.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shellcache_client::Network;
use shellcache_core::{CacheDb, CacheStorage, CacheStore, Error, Generation, Request, Response, SqliteStore};
use url::Url;

pub const SCOPE: &str = "http://localhost:8080/";

pub fn request(path: &str) -> Request {
    Request::get(Url::parse(SCOPE).unwrap().join(path).unwrap())
}

pub fn generation(name: &str, assets: &[&str]) -> Generation {
    Generation::new(name, Url::parse(SCOPE).unwrap(), assets.iter().map(|s| s.to_string()).collect()).unwrap()
}

#[derive(Default)]
struct Routes {
    responses: HashMap<String, Response>,
    failing: HashSet<String>,
    calls: Vec<String>,
}

/// In-process network keyed by URL path. Records every call.
#[derive(Clone, Default)]
pub struct MockNetwork {
    routes: Arc<Mutex<Routes>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: &str, body: &'static str) -> Self {
        self.with_response(path, Response::new(200, body).with_header("Content-Type", "text/plain"))
    }

    pub fn with_status(self, path: &str, status: u16, body: &'static str) -> Self {
        self.with_response(path, Response::new(status, body))
    }

    pub fn with_response(self, path: &str, response: Response) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            routes.failing.remove(path);
            routes.responses.insert(path.to_string(), response);
        }
        self
    }

    pub fn failing(self, path: &str) -> Self {
        self.routes.lock().unwrap().failing.insert(path.to_string());
        self
    }

    pub fn response_for(&self, path: &str) -> Option<Response> {
        self.routes.lock().unwrap().responses.get(path).cloned()
    }

    pub fn calls(&self) -> usize {
        self.routes.lock().unwrap().calls.len()
    }

    pub fn calls_for(&self, path: &str) -> usize {
        self.routes.lock().unwrap().calls.iter().filter(|p| *p == path).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let path = request.url.path().to_string();
        let mut routes = self.routes.lock().unwrap();
        routes.calls.push(path.clone());

        if routes.failing.contains(&path) {
            return Err(Error::Network(format!("{}: connection refused", request.url)));
        }

        Ok(routes
            .responses
            .get(&path)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "not found")))
    }
}

/// SQLite storage that can be told to fail deletes of named stores or puts.
pub struct FlakyStorage {
    db: CacheDb,
    fail_delete: HashSet<String>,
    fail_puts: bool,
}

impl FlakyStorage {
    pub fn new(db: CacheDb) -> Self {
        Self { db, fail_delete: HashSet::new(), fail_puts: false }
    }

    pub fn fail_delete(mut self, name: &str) -> Self {
        self.fail_delete.insert(name.to_string());
        self
    }

    pub fn fail_puts(mut self) -> Self {
        self.fail_puts = true;
        self
    }
}

pub struct FlakyStore {
    inner: SqliteStore,
    fail_puts: bool,
}

#[async_trait]
impl CacheStorage for FlakyStorage {
    type Store = FlakyStore;

    async fn open(&self, name: &str) -> Result<FlakyStore, Error> {
        Ok(FlakyStore { inner: self.db.open(name).await?, fail_puts: self.fail_puts })
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        self.db.has(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.db.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.fail_delete.contains(name) {
            return Err(Error::Serialization(format!("delete {name} refused")));
        }
        self.db.delete(name).await
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.inner.lookup(request).await
    }

    async fn put(&self, request: &Request, response: &Response) -> Result<(), Error> {
        if self.fail_puts {
            return Err(Error::Serialization("disk full".into()));
        }
        self.inner.put(request, response).await
    }

    async fn put_all(&self, entries: &[(Request, Response)]) -> Result<(), Error> {
        if self.fail_puts {
            return Err(Error::Serialization("disk full".into()));
        }
        self.inner.put_all(entries).await
    }

    async fn keys(&self) -> Result<Vec<Request>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, request: &Request) -> Result<bool, Error> {
        self.inner.delete(request).await
    }

    async fn count(&self) -> Result<usize, Error> {
        self.inner.count().await
    }
}
