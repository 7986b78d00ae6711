use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::core::{Flow, Middleware};
use crate::handler::HandlerResponse;

/// Result of running a route's middleware chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainResult {
    /// Every middleware let the request through
    Proceed,
    /// A middleware stopped the dispatch
    Halted {
        /// Name the halting middleware was registered under
        by: String,
        /// Output the middleware chose to emit, if any
        response: Option<HandlerResponse>,
    },
}

/// Name → middleware table
///
/// Unordered; order comes from each route's binding. Entries can be
/// registered at any point before the router is frozen.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    middlewares: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `middleware` under `name`, replacing any earlier entry.
    pub fn register<M>(&mut self, name: &str, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.register_arc(name, Arc::new(middleware));
    }

    /// Register an already shared middleware under `name`
    pub fn register_arc(&mut self, name: &str, middleware: Arc<dyn Middleware>) {
        if self
            .middlewares
            .insert(name.to_string(), middleware)
            .is_some()
        {
            warn!(middleware = %name, "Replaced existing middleware");
        } else {
            debug!(middleware = %name, "Middleware registered");
        }
    }

    /// True if a middleware is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.middlewares.contains_key(name)
    }

    /// Number of registered middlewares
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// True if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the named middlewares in order.
    ///
    /// Unknown names are skipped. The first middleware that does not return
    /// [`Flow::Continue`] stops the chain; the ones after it never run.
    pub fn run<S: AsRef<str>>(&self, names: &[S]) -> ChainResult {
        for name in names {
            let name = name.as_ref();
            let Some(middleware) = self.middlewares.get(name) else {
                debug!(middleware = %name, "Unregistered middleware skipped");
                continue;
            };

            match middleware.handle() {
                Flow::Continue => {
                    debug!(middleware = %name, "Middleware passed");
                }
                Flow::Halt => {
                    info!(middleware = %name, "Middleware halted dispatch");
                    return ChainResult::Halted {
                        by: name.to_string(),
                        response: None,
                    };
                }
                Flow::Respond(response) => {
                    info!(
                        middleware = %name,
                        status = response.status,
                        "Middleware halted dispatch with a response"
                    );
                    return ChainResult::Halted {
                        by: name.to_string(),
                        response: Some(response),
                    };
                }
            }
        }
        ChainResult::Proceed
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.middlewares.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("middlewares", &names)
            .finish()
    }
}
