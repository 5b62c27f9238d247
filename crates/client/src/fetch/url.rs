//! URL resolution and canonicalization for consistent cache keys.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request target against the application scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Join onto `scope` (absolute URLs replace it)
/// 3. Only http and https are accepted
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
/// 6. Keep query string intact (do not reorder)
pub fn resolve(scope: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    // join leaves absolute input untouched
    let mut parsed = scope.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("http://localhost:8080/").unwrap()
    }

    #[test]
    fn test_resolve_absolute_path() {
        let url = resolve(&scope(), "/pkg/recoder.js").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/pkg/recoder.js");
    }

    #[test]
    fn test_resolve_relative_to_nested_scope() {
        let scope = Url::parse("https://example.com/app/").unwrap();
        let url = resolve(&scope, "index.html").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/index.html");
    }

    #[test]
    fn test_resolve_full_url() {
        let url = resolve(&scope(), "https://cdn.example.com/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&scope(), "https://EXAMPLE.COM/a").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&scope(), "/index.html#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&scope(), "/data.json?b=2&a=1").unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_resolve_relative_path_with_url_in_query() {
        let url = resolve(&scope(), "/login?next=https://recoder.example/").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "/login");
        assert_eq!(url.query(), Some("next=https://recoder.example/"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&scope(), "  /app.js  ").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/app.js");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&scope(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&scope(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&scope(), "   "), Err(UrlError::Empty)));
    }
}
