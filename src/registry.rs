//! Registry of constructible controller types.
//!
//! `"Name@action"` handlers never instantiate anything dynamically: the
//! controller has to be registered here under `Name` with a factory. Each
//! dispatch builds a fresh instance from the factory and asks it to run the
//! action.
//!
//! ```rust
//! use mrouter::handler::{HandlerResponse, RouteParams};
//! use mrouter::registry::{Controller, ControllerRegistry};
//!
//! #[derive(Default)]
//! struct UserController;
//!
//! impl Controller for UserController {
//!     fn call(&self, action: &str, params: &RouteParams) -> Option<HandlerResponse> {
//!         match action {
//!             "index" => Some("all users".into()),
//!             "show" => Some(format!("user {}", &params[0]).into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register("UserController", UserController::default);
//! assert!(registry.contains("UserController"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::RouterError;
use crate::handler::{ControllerRef, HandlerResponse, RouteParams};

/// A controller exposing named actions
pub trait Controller: Send + Sync {
    /// Run `action` with the route's parameters.
    ///
    /// Return `None` when the controller has no such action; dispatch turns
    /// that into [`RouterError::UnknownAction`].
    fn call(&self, action: &str, params: &RouteParams) -> Option<HandlerResponse>;
}

type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

/// Name → factory table for controllers
#[derive(Clone, Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, ControllerFactory>,
}

impl ControllerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller factory under `name`.
    ///
    /// Registering the same name twice replaces the earlier factory.
    pub fn register<C, F>(&mut self, name: &str, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let factory: ControllerFactory =
            Arc::new(move || Box::new(factory()) as Box<dyn Controller>);
        if self.factories.insert(name.to_string(), factory).is_some() {
            warn!(controller = %name, "Replaced existing controller");
        } else {
            info!(
                controller = %name,
                total_controllers = self.factories.len(),
                "Controller registered"
            );
        }
    }

    /// True if a controller is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Number of registered controllers
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True if nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Construct the referenced controller and run its action
    pub fn invoke(
        &self,
        reference: &ControllerRef,
        params: &RouteParams,
    ) -> Result<HandlerResponse, RouterError> {
        let factory =
            self.factories
                .get(&reference.controller)
                .ok_or_else(|| RouterError::UnknownController {
                    controller: reference.controller.clone(),
                })?;

        let instance = factory();
        instance
            .call(&reference.action, params)
            .ok_or_else(|| RouterError::UnknownAction {
                controller: reference.controller.clone(),
                action: reference.action.clone(),
            })
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ControllerRegistry")
            .field("controllers", &names)
            .finish()
    }
}
