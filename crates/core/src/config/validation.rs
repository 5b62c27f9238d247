//! Checks applied to `AppConfig` after figment has merged every source.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

const MAX_BODY_CAP: usize = 500 * 1024 * 1024;
const TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=300_000;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Check loaded values before anything is opened or fetched.
    ///
    /// An empty `cache_name` is reported as [`ConfigError::Missing`]; out of
    /// range limits, an empty user agent and a rejected generation (bad
    /// scope, unresolvable or duplicate assets) as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_name".into(),
                hint: "set SHELLCACHE_CACHE_NAME or cache_name in the config file".into(),
            });
        }

        if self.max_bytes == 0 || self.max_bytes > MAX_BODY_CAP {
            return Err(invalid("max_bytes", "must be between 1 byte and 500MB"));
        }

        if !TIMEOUT_RANGE_MS.contains(&self.timeout_ms) {
            return Err(invalid("timeout_ms", "must be between 100ms and 300000ms"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        self.generation()?;

        if self.assets.is_empty() {
            tracing::warn!(cache = %self.cache_name, "asset list is empty; install will only create the store");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_cache_name() {
        let config = AppConfig { cache_name: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "cache_name"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_duplicate_assets() {
        let config = AppConfig { assets: vec!["/app.js".into(), "app.js".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "generation"));
    }

    #[test]
    fn test_validate_empty_assets_allowed() {
        let config = AppConfig { assets: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_range_bounds_inclusive() {
        let low = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(low.validate().is_ok());
        let high = AppConfig { max_bytes: 500 * 1024 * 1024, timeout_ms: 300_000, ..Default::default() };
        assert!(high.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_scope() {
        let config = AppConfig { scope: "ftp://localhost/".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "generation"));
    }
}
