//! Client code for shellcache.
//!
//! This crate provides the network side of the offline cache manager: the
//! `Network` trait the worker fetches through, a reqwest-backed
//! implementation, and URL resolution against the application scope.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, Network, UrlError, resolve};
