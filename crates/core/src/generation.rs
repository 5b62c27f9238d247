//! The cache generation a worker is built for.

use std::collections::HashSet;

use url::Url;

use crate::{Error, Request};

/// Cache name used when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "recoder-v1";

/// Scope used when none is configured.
pub const DEFAULT_SCOPE: &str = "http://localhost:8080/";

/// App-shell assets used when none are configured.
pub const DEFAULT_ASSETS: &[&str] =
    &["/", "/index.html", "/recoder.js", "/recoder_bg.wasm", "/pkg/recoder.js", "/pkg/recoder_bg.wasm"];

/// One deployment's cache configuration: the store name that is current,
/// the scope requests resolve against, and the app-shell asset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    cache_name: String,
    scope: Url,
    assets: Vec<String>,
}

impl Generation {
    /// Build a generation, rejecting an empty name, a non-http(s) scope,
    /// unresolvable asset paths and assets that resolve to the same URL.
    pub fn new(cache_name: impl Into<String>, scope: Url, assets: Vec<String>) -> Result<Self, Error> {
        let cache_name = cache_name.into();
        if cache_name.trim().is_empty() {
            return Err(Error::InvalidInput("cache name must not be empty".into()));
        }

        match scope.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidUrl(format!("unsupported scope scheme: {scheme}"))),
        }

        let generation = Self { cache_name, scope, assets };

        let mut seen = HashSet::new();
        for request in generation.asset_requests()? {
            if !seen.insert(request.url.clone()) {
                return Err(Error::InvalidInput(format!("duplicate asset: {}", request.url)));
            }
        }

        Ok(generation)
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Whether a store name belongs to this generation.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.cache_name
    }

    /// GET requests for every asset, in list order.
    pub fn asset_requests(&self) -> Result<Vec<Request>, Error> {
        self.assets
            .iter()
            .map(|path| {
                if path.trim().is_empty() {
                    return Err(Error::InvalidInput("asset path must not be empty".into()));
                }
                self.scope
                    .join(path.trim())
                    .map(Request::get)
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
            })
            .collect()
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            scope: Url::parse(DEFAULT_SCOPE).expect("default scope is a valid URL"),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("http://localhost:8080/").unwrap()
    }

    fn assets(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_generation() {
        let generation = Generation::default();
        assert_eq!(generation.cache_name(), "recoder-v1");
        assert_eq!(generation.assets().len(), 6);
        assert!(generation.is_current("recoder-v1"));
        assert!(!generation.is_current("recoder-v0"));
    }

    #[test]
    fn test_default_generation_is_valid() {
        let d = Generation::default();
        let rebuilt = Generation::new(d.cache_name(), d.scope().clone(), d.assets().to_vec()).unwrap();
        assert_eq!(rebuilt, d);
    }

    #[test]
    fn test_asset_requests_resolve_against_scope() {
        let generation = Generation::new("v1", scope(), assets(&["/", "/index.html", "app.js"])).unwrap();
        let urls: Vec<String> = generation.asset_requests().unwrap().iter().map(|r| r.url.to_string()).collect();
        assert_eq!(
            urls,
            vec!["http://localhost:8080/", "http://localhost:8080/index.html", "http://localhost:8080/app.js"]
        );
    }

    #[test]
    fn test_empty_asset_list_allowed() {
        let generation = Generation::new("v1", scope(), Vec::new()).unwrap();
        assert!(generation.asset_requests().unwrap().is_empty());
    }

    #[test]
    fn test_empty_cache_name_rejected() {
        let result = Generation::new("  ", scope(), assets(&["/"]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_duplicate_assets_rejected() {
        let result = Generation::new("v1", scope(), assets(&["/index.html", "index.html"]));
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_fragment_duplicates_rejected() {
        let result = Generation::new("v1", scope(), assets(&["/", "/#main"]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_asset_rejected() {
        let result = Generation::new("v1", scope(), assets(&["/", ""]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_non_http_scope_rejected() {
        let result = Generation::new("v1", Url::parse("file:///srv/app/").unwrap(), assets(&["/"]));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
