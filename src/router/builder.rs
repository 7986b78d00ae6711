use http::Method;
use serde_json::Value;

use super::core::{Route, Router};

/// Fluent helper returned by route registration
///
/// Bound to exactly one registered route. Every method returns the builder so
/// calls chain:
///
/// ```rust
/// use mrouter::router::Router;
///
/// let mut router = Router::new();
/// router
///     .get("/users", "UserController@index")
///     .name("users.list")
///     .middleware(&["auth"])
///     .with("description", "Displays all users");
///
/// assert_eq!(router.named_route("users.list"), Some("/users"));
/// ```
pub struct RouteBuilder<'a> {
    router: &'a mut Router,
    method: Method,
    path: String,
    index: usize,
}

impl<'a> RouteBuilder<'a> {
    pub(crate) fn new(router: &'a mut Router, method: Method, path: String, index: usize) -> Self {
        Self {
            router,
            method,
            path,
            index,
        }
    }

    /// Replace the middleware bound to this route.
    ///
    /// Not additive: a second call, or a call on a route inside a group with
    /// middleware, overwrites the earlier list.
    pub fn middleware<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        let names = names.iter().map(|n| n.as_ref().to_string()).collect();
        self.router
            .bind_middleware(self.method.clone(), self.path.clone(), names);
        self
    }

    /// Name this route for reverse lookup; the latest route given a name wins
    pub fn name(mut self, name: &str) -> Self {
        self.router.add_named_route(name, &self.path);
        self
    }

    /// Set one key in the route's metadata; the last write per key wins
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.router
            .set_route_data(&self.method, self.index, key, value.into());
        self
    }

    /// Method of the bound route
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalized path of the bound route
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The bound route as currently stored
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.router.routes_for(&self.method).get(self.index)
    }
}
