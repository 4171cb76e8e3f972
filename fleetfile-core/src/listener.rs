//! The listener contract.
//!
//! A dispatcher holds a set of [`EventListener`]s and fans lifecycle and
//! topology events out to each of them. It guarantees:
//!
//! - [`startup`](EventListener::startup) precedes the first
//!   [`apply`](EventListener::apply);
//! - no task event for a cluster arrives before that cluster appeared in an
//!   `apply`;
//! - [`shutdown`](EventListener::shutdown) comes last, with nothing pending.
//!
//! Methods take `&mut self`: calls on one listener are never concurrent.

use crate::types::{AppBackend, AppCluster, AppId};

/// Where a removed backend used to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedFrom<'a> {
    /// The cluster still exists; `task` is no longer among its backends.
    Cluster(&'a AppCluster),
    /// The whole cluster was torn down.
    Retired(&'a AppId),
}

impl RemovedFrom<'_> {
    pub fn app_id(&self) -> &AppId {
        match self {
            RemovedFrom::Cluster(app) => &app.id,
            RemovedFrom::Retired(id) => id,
        }
    }
}

/// Hooks into service discovery: cluster synchronization and backend churn.
pub trait EventListener {
    /// Invoked once, before any other method.
    fn startup(&mut self);

    /// Invoked once at termination. Must not block indefinitely.
    fn shutdown(&mut self);

    /// Converge to exactly `apps`: nothing more, nothing less.
    ///
    /// Invoked at startup and on every full resynchronization. Calling it twice
    /// with the same set has no effect beyond the first call.
    fn apply(&mut self, apps: &[AppCluster]);

    /// `task` joined `app`.
    ///
    /// The caller has already added `task` to `app.backends`.
    fn add_task(&mut self, task: &AppBackend, app: &AppCluster);

    /// `task` left its cluster.
    ///
    /// For [`RemovedFrom::Cluster`] the caller has already removed `task`
    /// from the cluster's backends.
    fn remove_task(&mut self, task: &AppBackend, from: RemovedFrom<'_>);
}
