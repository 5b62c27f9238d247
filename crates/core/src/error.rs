//! Unified error types for shellcache.
//!
//! Every message starts with a stable code so hosts and logs can match on it.

use tokio_rusqlite::rusqlite;

/// Unified error types for the offline cache manager.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty cache name, duplicate asset).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport-level network failure.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// An app-shell asset came back with a non-success status.
    #[error("BAD_STATUS: {url} returned {status}")]
    BadStatus { url: String, status: u16 },

    /// Install aborted; nothing was written to the store.
    #[error("INSTALL_FAILED: {cache_name}: {source}")]
    InstallFailed { cache_name: String, source: Box<Error> },

    /// One or more stale stores could not be deleted during activation.
    #[error("ACTIVATION_FAILED: could not delete {}", .failed.join(", "))]
    ActivationFailed { failed: Vec<String> },

    /// A fetch was dispatched while no worker is active.
    #[error("NOT_ACTIVE: no activated worker for this scope")]
    NotActive,

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored headers could not be encoded or decoded.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),
}

impl Error {
    /// Stable code prefix for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Network(_) => "NETWORK_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::BadStatus { .. } => "BAD_STATUS",
            Error::InstallFailed { .. } => "INSTALL_FAILED",
            Error::ActivationFailed { .. } => "ACTIVATION_FAILED",
            Error::NotActive => "NOT_ACTIVE",
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) => "CACHE_ERROR",
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
