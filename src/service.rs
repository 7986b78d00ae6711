//! Shared dispatcher handle that can be replaced at runtime.
//!
//! Request threads call [`RouterService::load`] (or [`RouterService::dispatch`])
//! and get a complete route set; [`RouterService::replace`] installs a new one
//! atomically. A reader never sees a half-built table: it keeps the snapshot it
//! loaded until it drops it.

use arc_swap::ArcSwap;
use http::Method;
use std::sync::Arc;
use tracing::info;

use crate::dispatcher::{Dispatcher, Outcome};
use crate::error::RouterError;
use crate::request::RequestSource;
use crate::router::Router;

/// Atomically swappable [`Dispatcher`]
pub struct RouterService {
    current: ArcSwap<Dispatcher>,
}

impl RouterService {
    /// Wrap an initial dispatcher
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            current: ArcSwap::from_pointee(dispatcher),
        }
    }

    /// Freeze `router` and serve it
    #[must_use]
    pub fn from_router(router: Router) -> Self {
        Self::new(router.into_dispatcher())
    }

    /// Current snapshot
    #[must_use]
    pub fn load(&self) -> Arc<Dispatcher> {
        self.current.load_full()
    }

    /// Install a new route set, returning the one it replaced
    pub fn replace(&self, dispatcher: Dispatcher) -> Arc<Dispatcher> {
        let routes_count = dispatcher.len();
        let previous = self.current.swap(Arc::new(dispatcher));
        info!(
            routes_count,
            previous_routes = previous.len(),
            "Route set replaced"
        );
        previous
    }

    /// Dispatch against the current snapshot
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Outcome, RouterError> {
        self.current.load().dispatch(method, path)
    }

    /// Dispatch a request from the hosting environment against the current snapshot
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch_request<S>(&self, source: &S) -> Result<Outcome, RouterError>
    where
        S: RequestSource + ?Sized,
    {
        self.current.load().dispatch_request(source)
    }
}

impl std::fmt::Debug for RouterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterService")
            .field("current", &*self.current.load())
            .finish()
    }
}
