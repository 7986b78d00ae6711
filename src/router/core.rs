//! Route registry: per-method route lists, group context stack, middleware
//! bindings and the named-route table.

use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, info};

use super::builder::RouteBuilder;
use crate::dispatcher::Dispatcher;
use crate::handler::{Handler, RouteData, ViewRenderer};
use crate::middleware::{Middleware, MiddlewareRegistry};
use crate::registry::{Controller, ControllerRegistry};
use crate::runtime_config::RuntimeConfig;

/// A registered route
#[derive(Debug, Clone)]
pub struct Route {
    /// HTTP method the route answers to
    pub method: Method,
    /// Normalized path template (leading slash, no trailing slash, `/` for root)
    pub path: String,
    /// What runs when the route matches
    pub handler: Handler,
    /// Arbitrary metadata, handed to view renderers
    pub data: RouteData,
}

/// Prefix and middleware applied to routes registered inside a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupContext {
    /// Composed prefix without leading or trailing slashes (`admin/users`)
    pub prefix: String,
    /// Parent middleware followed by this group's, duplicates kept
    pub middleware: Vec<String>,
}

pub(crate) type RouteKey = (Method, String);

/// Mutable registration context
///
/// Collect routes, groups, middleware, controllers and the not-found handler
/// here, then call [`Router::into_dispatcher`] to get an immutable
/// [`Dispatcher`]. A `Router` is an ordinary owned value; create a fresh one
/// per test or per route set.
pub struct Router {
    pub(crate) routes: HashMap<Method, Vec<Route>>,
    /// (method, index) pairs in overall registration order, for listings
    pub(crate) order: Vec<(Method, usize)>,
    pub(crate) route_middleware: HashMap<RouteKey, Vec<String>>,
    pub(crate) middleware: MiddlewareRegistry,
    pub(crate) named_routes: HashMap<String, String>,
    pub(crate) controllers: ControllerRegistry,
    pub(crate) not_found: Option<Handler>,
    pub(crate) view_renderer: Option<Arc<dyn ViewRenderer>>,
    pub(crate) base_path: String,
    groups: Vec<GroupContext>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create an empty router
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            order: Vec::new(),
            route_middleware: HashMap::new(),
            middleware: MiddlewareRegistry::new(),
            named_routes: HashMap::new(),
            controllers: ControllerRegistry::new(),
            not_found: None,
            view_renderer: None,
            base_path: String::new(),
            groups: Vec::new(),
        }
    }

    /// Create an empty router with settings from the runtime configuration
    #[must_use]
    pub fn with_config(config: &RuntimeConfig) -> Self {
        let mut router = Self::new();
        if let Some(base_path) = &config.base_path {
            router.set_base_path(base_path);
        }
        router
    }

    // ----------------------------------------
    // Route definitions
    // ----------------------------------------

    /// Register a GET route
    pub fn get(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::GET, uri, handler, RouteData::new())
    }

    /// Register a POST route
    pub fn post(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::POST, uri, handler, RouteData::new())
    }

    /// Register a PUT route
    pub fn put(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::PUT, uri, handler, RouteData::new())
    }

    /// Register a PATCH route
    pub fn patch(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::PATCH, uri, handler, RouteData::new())
    }

    /// Register a DELETE route
    pub fn delete(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::DELETE, uri, handler, RouteData::new())
    }

    /// Register an OPTIONS route
    pub fn options(&mut self, uri: &str, handler: impl Into<Handler>) -> RouteBuilder<'_> {
        self.register(Method::OPTIONS, uri, handler, RouteData::new())
    }

    /// Register the same handler and data for several methods.
    ///
    /// Every created route gets its own copy of `data`. The returned builder
    /// is bound to the route created for the last method in `methods`;
    /// `None` when `methods` is empty.
    pub fn match_methods(
        &mut self,
        methods: &[Method],
        uri: &str,
        handler: impl Into<Handler>,
        data: RouteData,
    ) -> Option<RouteBuilder<'_>> {
        let (last, rest) = methods.split_last()?;
        let handler = handler.into();
        for method in rest {
            self.insert_route(method.clone(), uri, handler.clone(), data.clone());
        }
        let (method, path, index) = self.insert_route(last.clone(), uri, handler, data);
        Some(RouteBuilder::new(self, method, path, index))
    }

    /// Register a route.
    ///
    /// The URI is joined with the active group prefix and normalized. The
    /// route is appended to its method's list, so earlier registrations take
    /// priority at dispatch. If the active group carries middleware, it is
    /// bound to the new route.
    pub fn register(
        &mut self,
        method: Method,
        uri: &str,
        handler: impl Into<Handler>,
        data: RouteData,
    ) -> RouteBuilder<'_> {
        let (method, path, index) = self.insert_route(method, uri, handler.into(), data);
        RouteBuilder::new(self, method, path, index)
    }

    fn insert_route(
        &mut self,
        method: Method,
        uri: &str,
        handler: Handler,
        data: RouteData,
    ) -> (Method, String, usize) {
        let prefix = self.groups.last().map(|g| g.prefix.as_str()).unwrap_or("");
        let path = normalize_uri(prefix, uri);

        info!(
            method = %method,
            path = %path,
            handler = %handler.describe(),
            "Route registered"
        );

        let list = self.routes.entry(method.clone()).or_default();
        list.push(Route {
            method: method.clone(),
            path: path.clone(),
            handler,
            data,
        });
        let index = list.len() - 1;
        self.order.push((method.clone(), index));

        let group_middleware = self
            .groups
            .last()
            .map(|g| g.middleware.clone())
            .unwrap_or_default();
        if !group_middleware.is_empty() {
            self.bind_middleware(method.clone(), path.clone(), group_middleware);
        }

        (method, path, index)
    }

    // ----------------------------------------
    // Grouping
    // ----------------------------------------

    /// Register routes under a shared prefix and middleware list.
    ///
    /// Inside `body`, the prefix is the parent prefix joined with `prefix`
    /// and the middleware is the parent list followed by `middleware`.
    /// Groups nest. The previous prefix and middleware are restored when
    /// `body` returns, and also when it unwinds.
    ///
    /// Whatever `body` returns is passed through, so a body that returns a
    /// `Result` can be used with `?`.
    pub fn group<S, F, R>(&mut self, prefix: &str, middleware: &[S], body: F) -> R
    where
        S: AsRef<str>,
        F: FnOnce(&mut Router) -> R,
    {
        let parent = self.current_group();
        let mut merged = parent.middleware;
        merged.extend(middleware.iter().map(|m| m.as_ref().to_string()));
        let context = GroupContext {
            prefix: compose_prefix(&parent.prefix, prefix),
            middleware: merged,
        };

        debug!(
            prefix = %context.prefix,
            middleware = ?context.middleware,
            depth = self.groups.len() + 1,
            "Entering route group"
        );

        let depth = self.groups.len();
        self.groups.push(context);
        let mut scope = GroupScope {
            router: self,
            depth,
        };
        body(&mut *scope)
    }

    /// The group context routes are currently registered under
    #[must_use]
    pub fn current_group(&self) -> GroupContext {
        self.groups.last().cloned().unwrap_or_default()
    }

    // ----------------------------------------
    // Middleware
    // ----------------------------------------

    /// Register a middleware under `name`, replacing any earlier one
    pub fn register_middleware<M>(&mut self, name: &str, middleware: M)
    where
        M: Middleware + 'static,
    {
        self.middleware.register(name, middleware);
    }

    /// Bind middleware names to the route registered for `method` and `uri`.
    ///
    /// Replaces any existing binding for that route. `uri` is normalized but
    /// not joined with the active group prefix: pass the full route path.
    pub fn attach_middleware<S: AsRef<str>>(&mut self, method: Method, uri: &str, names: &[S]) {
        let path = normalize_uri("", uri);
        let names = names.iter().map(|n| n.as_ref().to_string()).collect();
        self.bind_middleware(method, path, names);
    }

    pub(crate) fn bind_middleware(&mut self, method: Method, path: String, names: Vec<String>) {
        debug!(
            method = %method,
            path = %path,
            middleware = ?names,
            "Middleware bound to route"
        );
        self.route_middleware.insert((method, path), names);
    }

    /// Middleware names bound to a route, empty if none
    #[must_use]
    pub fn route_middleware(&self, method: &Method, uri: &str) -> &[String] {
        let key = (method.clone(), normalize_uri("", uri));
        self.route_middleware
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The middleware registry
    #[must_use]
    pub fn middlewares(&self) -> &MiddlewareRegistry {
        &self.middleware
    }

    // ----------------------------------------
    // Named routes
    // ----------------------------------------

    /// Name a route path; a later call with the same name wins
    pub fn add_named_route(&mut self, name: &str, uri: &str) {
        let path = normalize_uri("", uri);
        debug!(name = %name, path = %path, "Named route registered");
        self.named_routes.insert(name.to_string(), path);
    }

    /// Path registered under `name`
    #[must_use]
    pub fn named_route(&self, name: &str) -> Option<&str> {
        self.named_routes.get(name).map(String::as_str)
    }

    // ----------------------------------------
    // Handlers and environment
    // ----------------------------------------

    /// Register a controller for `"Name@action"` handlers
    pub fn register_controller<C, F>(&mut self, name: &str, factory: F)
    where
        C: Controller + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        self.controllers.register(name, factory);
    }

    /// Install the renderer used for view-template handlers
    pub fn set_view_renderer<V>(&mut self, renderer: V)
    where
        V: ViewRenderer + 'static,
    {
        self.view_renderer = Some(Arc::new(renderer));
    }

    /// Handler invoked when no route matches
    pub fn not_found(&mut self, handler: impl Into<Handler>) {
        self.not_found = Some(handler.into());
    }

    /// Prefix stripped from request paths before matching (e.g. `/app`)
    pub fn set_base_path(&mut self, path: &str) {
        let trimmed = path.trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        debug!(base_path = %self.base_path, "Base path set");
    }

    /// The configured base path, empty if none
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // ----------------------------------------
    // Introspection
    // ----------------------------------------

    /// Routes for one method, in match-priority order
    #[must_use]
    pub fn routes_for(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.order
            .iter()
            .filter_map(|(method, index)| self.routes.get(method)?.get(*index))
    }

    /// Number of registered routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if no routes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn route_mut(&mut self, method: &Method, index: usize) -> Option<&mut Route> {
        self.routes.get_mut(method)?.get_mut(index)
    }

    pub(crate) fn set_route_data(&mut self, method: &Method, index: usize, key: &str, value: Value) {
        if let Some(route) = self.route_mut(method, index) {
            route.data.insert(key.to_string(), value);
        }
    }

    /// Freeze the route set into a dispatcher
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        Dispatcher::new(self)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.len())
            .field("base_path", &self.base_path)
            .field("named_routes", &self.named_routes)
            .field("middleware", &self.middleware)
            .field("controllers", &self.controllers)
            .field("groups", &self.groups)
            .finish()
    }
}

/// Restores the group stack when a group body ends, including on unwind
struct GroupScope<'a> {
    router: &'a mut Router,
    depth: usize,
}

impl Deref for GroupScope<'_> {
    type Target = Router;

    fn deref(&self) -> &Router {
        self.router
    }
}

impl DerefMut for GroupScope<'_> {
    fn deref_mut(&mut self) -> &mut Router {
        self.router
    }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        self.router.groups.truncate(self.depth);
        debug!(depth = self.depth, "Left route group");
    }
}

/// Join a parent group prefix and a child prefix, without outer slashes
fn compose_prefix(parent: &str, child: &str) -> String {
    let child = child.trim_matches('/');
    let joined = if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{child}")
    };
    joined.trim_matches('/').to_string()
}

/// Canonical route path: group prefix joined with `uri`, a single leading
/// slash, no trailing slash, `/` for the root.
pub(crate) fn normalize_uri(prefix: &str, uri: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let uri = uri.trim_matches('/');
    let joined = match (prefix.is_empty(), uri.is_empty()) {
        (true, _) => uri.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}/{uri}"),
    };
    if joined.is_empty() {
        "/".to_string()
    } else {
        format!("/{joined}")
    }
}
