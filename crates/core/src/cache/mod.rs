//! SQLite-backed named cache stores.
//!
//! This module provides persistent request -> response stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Any number of named stores, one per cache generation
//! - Method + URL cache keys using SHA-256 hashing
//! - Atomic bulk inserts for app-shell population
//! - Automatic schema migrations

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::compute_cache_key;
pub use storage::{CacheStorage, CacheStore};
pub use stores::SqliteStore;
