//! Host-side lifecycle driver for one scope.
//!
//! A registration holds the active worker and moves each newly registered
//! worker through install and activate. A worker whose install fails never
//! takes over; the previously active one keeps serving.

use std::fmt;

use shellcache_core::{Error, Request};

use crate::lifecycle::{ActivationReport, FetchOutcome, InstallReport, Lifecycle};

/// Lifecycle states of a registered worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Registered, nothing dispatched yet
    Parsed,
    /// Install event dispatched
    Installing,
    /// Install succeeded, waiting to activate
    Installed,
    /// Activate event dispatched
    Activating,
    /// Active and answering fetches
    Activated,
    /// Failed to install, or replaced by a newer worker
    Redundant,
}

impl WorkerState {
    /// Whether fetches may be routed to a worker in this state.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterReport {
    pub install: InstallReport,
    pub activation: ActivationReport,
}

/// The active worker for a scope plus the state of the latest registration.
pub struct Registration<L> {
    active: Option<(L, WorkerState)>,
    state: Option<WorkerState>,
}

impl<L> Default for Registration<L> {
    fn default() -> Self {
        Self { active: None, state: None }
    }
}

impl<L: Lifecycle> Registration<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the most recently registered worker, if any.
    pub fn state(&self) -> Option<WorkerState> {
        self.state
    }

    /// The worker currently answering fetches.
    pub fn active(&self) -> Option<&L> {
        self.active.as_ref().map(|(worker, _)| worker)
    }

    /// Retire the active worker. Fetches are refused until the next
    /// successful registration.
    pub fn unregister(&mut self) -> Option<&L> {
        let (worker, state) = self.active.as_mut()?;
        tracing::info!(cache = worker.cache_name(), "worker unregistered");
        *state = WorkerState::Redundant;
        Some(&*worker)
    }

    fn transition(&mut self, cache_name: &str, to: WorkerState) {
        tracing::debug!(cache = cache_name, from = ?self.state, %to, "worker state");
        self.state = Some(to);
    }

    /// Install and activate `worker`, then make it the active worker.
    ///
    /// If install fails the worker is discarded and any previous worker stays
    /// active. If install succeeds the worker takes over even when activation
    /// reports stale stores it could not delete; that error is still returned.
    pub async fn register(&mut self, worker: L) -> Result<RegisterReport, Error> {
        let name = worker.cache_name().to_string();
        self.transition(&name, WorkerState::Parsed);

        self.transition(&name, WorkerState::Installing);
        let install = match worker.install().await {
            Ok(report) => report,
            Err(e) => {
                self.transition(&name, WorkerState::Redundant);
                if let Some((active, _)) = &self.active {
                    tracing::info!(cache = active.cache_name(), "keeping previous worker active");
                }
                return Err(e);
            }
        };
        self.transition(&name, WorkerState::Installed);

        self.transition(&name, WorkerState::Activating);
        let activation = worker.activate().await;

        if let Some((previous, _)) = self.active.replace((worker, WorkerState::Activated)) {
            tracing::debug!(cache = previous.cache_name(), "previous worker is redundant");
        }
        self.transition(&name, WorkerState::Activated);

        Ok(RegisterReport { install, activation: activation? })
    }

    /// Route an intercepted request to the active worker.
    ///
    /// Returns [`Error::NotActive`] when no worker is in a state that may
    /// intercept fetches.
    pub async fn dispatch_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        match &self.active {
            Some((worker, state)) if state.can_intercept_fetch() => worker.fetch(request).await,
            _ => Err(Error::NotActive),
        }
    }
}
