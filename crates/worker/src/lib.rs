//! The offline cache manager.
//!
//! Reacts to three lifecycle events:
//! - install: populate the current generation's store with the app shell
//! - activate: delete every store that belongs to another generation
//! - fetch: answer from the store, falling back to the network and
//!   remembering what it fetched
//!
//! [`Registration`] plays the host side, driving a worker through its
//! lifecycle and routing fetches to whichever worker is active.

pub mod lifecycle;
pub mod manager;
pub mod registration;

#[cfg(test)]
mod testing;

pub use lifecycle::{ActivationReport, FetchOutcome, InstallReport, Lifecycle, ResponseSource};
pub use manager::{OfflineCacheManager, add_all};
pub use registration::{RegisterReport, Registration, WorkerState};
