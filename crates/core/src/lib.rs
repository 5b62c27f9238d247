//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Request/response model and cache keys
//! - Named cache storage with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod message;

pub use cache::{CacheDb, CacheStorage, CacheStore, SqliteStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use generation::Generation;
pub use message::{Request, Response};
