//! Dispatcher core module - the request hot path.

use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::RouterError;
use crate::handler::{Handler, HandlerResponse, RouteData, RouteParams, ViewRenderer};
use crate::middleware::{ChainResult, MiddlewareRegistry};
use crate::registry::ControllerRegistry;
use crate::request::RequestSource;
use crate::router::{normalize_uri, PatternCache, Route, Router, Segment};

/// How a dispatch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched and its handler produced this response
    Handled(HandlerResponse),
    /// No route matched; response from the not-found handler or the default
    NotFound(HandlerResponse),
    /// A middleware halted the dispatch, optionally with its own response
    Aborted(Option<HandlerResponse>),
}

impl Outcome {
    /// The response the environment should emit; `None` means write nothing
    #[must_use]
    pub fn into_response(self) -> Option<HandlerResponse> {
        match self {
            Outcome::Handled(r) | Outcome::NotFound(r) => Some(r),
            Outcome::Aborted(r) => r,
        }
    }

    /// Body text of the emitted response, empty when nothing is written
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Outcome::Handled(r) | Outcome::NotFound(r) => &r.body,
            Outcome::Aborted(Some(r)) => &r.body,
            Outcome::Aborted(None) => "",
        }
    }

    /// Status code of the emitted response, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Handled(r) | Outcome::NotFound(r) => Some(r.status),
            Outcome::Aborted(r) => r.as_ref().map(|r| r.status),
        }
    }

    /// True if no route matched
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound(_))
    }

    /// True if a middleware stopped the dispatch
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted(_))
    }
}

/// A route selected for a request path, with its captures
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The winning route
    pub route: &'a Route,
    /// Captured placeholder values in declaration order
    pub params: RouteParams,
}

/// Frozen route set that resolves requests
///
/// Built with [`Router::into_dispatcher`]. Everything except the pattern
/// cache is read-only, so a dispatcher can be wrapped in an `Arc` and used
/// from many threads at once without locking.
pub struct Dispatcher {
    routes: HashMap<Method, Vec<Route>>,
    order: Vec<(Method, usize)>,
    route_middleware: HashMap<(Method, String), Vec<String>>,
    middleware: MiddlewareRegistry,
    named_routes: HashMap<String, String>,
    controllers: ControllerRegistry,
    not_found: Option<Handler>,
    view_renderer: Option<Arc<dyn ViewRenderer>>,
    base_path: String,
    patterns: PatternCache,
}

impl Dispatcher {
    pub(crate) fn new(router: Router) -> Self {
        let Router {
            routes,
            order,
            route_middleware,
            middleware,
            named_routes,
            controllers,
            not_found,
            view_renderer,
            base_path,
            ..
        } = router;

        info!(
            routes_count = order.len(),
            named_routes = named_routes.len(),
            middleware_bindings = route_middleware.len(),
            base_path = %base_path,
            "Routing table frozen"
        );

        Self {
            routes,
            order,
            route_middleware,
            middleware,
            named_routes,
            controllers,
            not_found,
            view_renderer,
            base_path,
            patterns: PatternCache::new(),
        }
    }

    /// Dispatch a request.
    ///
    /// 1. The path is normalized (query string and fragment dropped, base
    ///    path stripped, trailing slash removed).
    /// 2. Routes for `method` are scanned in registration order; the first
    ///    whose template matches wins.
    /// 3. The route's middleware chain runs. A halt ends the dispatch with
    ///    [`Outcome::Aborted`] and the handler never runs.
    /// 4. The handler runs with the captured parameters.
    ///
    /// With no match, the not-found handler (or a default 404 body) produces
    /// [`Outcome::NotFound`].
    ///
    /// # Errors
    ///
    /// A handler that cannot be resolved (unknown controller or action, view
    /// without a renderer, renderer failure) is returned as an error rather
    /// than producing empty output.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Outcome, RouterError> {
        let start = Instant::now();
        let path = self.normalize_request_path(path);

        debug!(method = %method, path = %path, "Route match attempt");

        let Some(matched) = self.find_normalized(method, &path) else {
            warn!(
                method = %method,
                path = %path,
                duration_us = start.elapsed().as_micros(),
                "No route matched"
            );
            return self.handle_not_found(method, &path).map(Outcome::NotFound);
        };

        let route = matched.route;
        info!(
            method = %method,
            path = %path,
            route_pattern = %route.path,
            handler = %route.handler.describe(),
            path_params = ?matched.params,
            duration_us = start.elapsed().as_micros(),
            "Route matched"
        );

        let names = self.middleware_for(&route.method, &route.path);
        if let ChainResult::Halted { by, response } = self.middleware.run(names) {
            debug!(
                method = %method,
                path = %path,
                middleware = %by,
                "Dispatch aborted by middleware"
            );
            return Ok(Outcome::Aborted(response));
        }

        let response = self.invoke(&route.handler, &matched.params, &route.data)?;
        debug!(
            method = %method,
            path = %path,
            status = response.status,
            duration_us = start.elapsed().as_micros(),
            "Handler completed"
        );
        Ok(Outcome::Handled(response))
    }

    /// Dispatch the request described by the hosting environment
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub fn dispatch_request<S>(&self, source: &S) -> Result<Outcome, RouterError>
    where
        S: RequestSource + ?Sized,
    {
        self.dispatch(source.method(), source.request_uri())
    }

    /// Find the route a request would dispatch to, without running anything
    #[must_use]
    pub fn find_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let path = self.normalize_request_path(path);
        self.find_normalized(method, &path)
    }

    fn find_normalized(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.get(method)?.iter().find_map(|route| {
            let pattern = self.patterns.get_or_compile(&route.path);
            pattern.captures(path).map(|params| RouteMatch {
                route,
                params: RouteParams::new(params),
            })
        })
    }

    /// Normalize a raw request URI the way route paths are normalized
    #[must_use]
    pub fn normalize_request_path(&self, raw: &str) -> String {
        let path = request_path(raw);
        let path = strip_base_path(&path, &self.base_path);
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    fn middleware_for(&self, method: &Method, path: &str) -> &[String] {
        self.route_middleware
            .get(&(method.clone(), path.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn invoke(
        &self,
        handler: &Handler,
        params: &RouteParams,
        data: &RouteData,
    ) -> Result<HandlerResponse, RouterError> {
        let result = match handler {
            Handler::Callable(f) => Ok(f(params)),
            Handler::Controller(reference) => self.controllers.invoke(reference, params),
            Handler::View(template) => match &self.view_renderer {
                Some(renderer) => renderer
                    .render(template, data)
                    .map(HandlerResponse::ok)
                    .map_err(|message| RouterError::ViewRender {
                        template: template.clone(),
                        message,
                    }),
                None => Err(RouterError::MissingViewRenderer {
                    template: template.clone(),
                }),
            },
        };

        if let Err(e) = &result {
            error!(handler = %handler.describe(), error = %e, "Route handler could not be resolved");
        }
        result
    }

    fn handle_not_found(&self, method: &Method, path: &str) -> Result<HandlerResponse, RouterError> {
        let Some(handler) = &self.not_found else {
            return Ok(HandlerResponse::new(
                404,
                format!("404 Not Found: no route for {method} {path}"),
            ));
        };

        let mut response = self.invoke(handler, &RouteParams::default(), &RouteData::new())?;
        if response.status == 200 {
            response.status = 404;
        }
        Ok(response)
    }

    // ----------------------------------------
    // Lookup
    // ----------------------------------------

    /// Path registered under a route name
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&str> {
        self.named_routes.get(name).map(String::as_str)
    }

    /// Build a URL for a named route, filling its `{name}` placeholders.
    ///
    /// The base path, if any, is prepended.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownRouteName`] if no route carries `name`,
    /// [`RouterError::MissingRouteParameter`] if a placeholder has no value.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        let template = self
            .view(name)
            .ok_or_else(|| RouterError::UnknownRouteName {
                name: name.to_string(),
            })?;

        let pattern = self.patterns.get_or_compile(template);
        let mut url = self.base_path.clone();
        for segment in pattern.segments() {
            url.push('/');
            match segment {
                Segment::Literal(literal) => url.push_str(literal),
                Segment::Param(param) => {
                    let value = params
                        .iter()
                        .rev()
                        .find(|(k, _)| *k == param.as_ref())
                        .map(|(_, v)| *v)
                        .ok_or_else(|| RouterError::MissingRouteParameter {
                            name: name.to_string(),
                            parameter: param.to_string(),
                        })?;
                    url.push_str(value);
                }
            }
        }
        if url.is_empty() {
            url.push('/');
        }
        Ok(url)
    }

    // ----------------------------------------
    // Introspection
    // ----------------------------------------

    /// Middleware names bound to a route, empty if none
    #[must_use]
    pub fn route_middleware(&self, method: &Method, uri: &str) -> &[String] {
        self.middleware_for(method, &normalize_uri("", uri))
    }

    /// Route names pointing at `path`
    #[must_use]
    pub fn names_for(&self, path: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .named_routes
            .iter()
            .filter(|(_, p)| p.as_str() == path)
            .map(|(n, _)| n.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// All routes in registration order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.order
            .iter()
            .filter_map(|(method, index)| self.routes.get(method)?.get(*index))
    }

    /// Number of routes
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the route set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Configured base path, empty if none
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Compiled-template cache
    #[must_use]
    pub fn pattern_cache(&self) -> &PatternCache {
        &self.patterns
    }

    /// One line per route: `METHOD path -> handler [middleware] (names)`
    #[must_use]
    pub fn route_table(&self) -> Vec<String> {
        self.routes()
            .map(|route| {
                let mut line = format!(
                    "{} {} -> {}",
                    route.method,
                    route.path,
                    route.handler.describe()
                );
                let middleware = self.middleware_for(&route.method, &route.path);
                if !middleware.is_empty() {
                    line.push_str(&format!(" [{}]", middleware.join(", ")));
                }
                let names = self.names_for(&route.path);
                if !names.is_empty() {
                    line.push_str(&format!(" ({})", names.join(", ")));
                }
                line
            })
            .collect()
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!(
            "[routes] base_path={} count={}",
            if self.base_path.is_empty() {
                "/"
            } else {
                self.base_path.as_str()
            },
            self.len()
        );
        for line in self.route_table() {
            println!("[route] {line}");
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.len())
            .field("base_path", &self.base_path)
            .field("compiled_patterns", &self.patterns.len())
            .finish()
    }
}

/// Path component of a request URI, with query string and fragment removed
fn request_path(raw: &str) -> String {
    match raw.parse::<http::Uri>() {
        Ok(uri) if uri.scheme().is_some() || raw.starts_with('/') => uri.path().to_string(),
        _ => raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Strip `base` when it is a whole-segment prefix of `path`
fn strip_base_path<'a>(path: &'a str, base: &str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher_with_base(base: &str) -> Dispatcher {
        let mut router = Router::new();
        router.set_base_path(base);
        router.into_dispatcher()
    }

    #[test]
    fn test_request_path_strips_query_and_fragment() {
        assert_eq!(request_path("/users?page=2"), "/users");
        assert_eq!(request_path("/users#top"), "/users");
        assert_eq!(request_path("http://example.com/a/b?x=1"), "/a/b");
        assert_eq!(request_path(""), "");
    }

    #[test]
    fn test_normalize_request_path() {
        let d = dispatcher_with_base("");
        assert_eq!(d.normalize_request_path("/"), "/");
        assert_eq!(d.normalize_request_path(""), "/");
        assert_eq!(d.normalize_request_path("/hello/"), "/hello");
        assert_eq!(d.normalize_request_path("/hello///"), "/hello");
        assert_eq!(d.normalize_request_path("/hello?x=1"), "/hello");
    }

    #[test]
    fn test_base_path_is_segment_aligned() {
        let d = dispatcher_with_base("/app/");
        assert_eq!(d.base_path(), "/app");
        assert_eq!(d.normalize_request_path("/app"), "/");
        assert_eq!(d.normalize_request_path("/app/users"), "/users");
        assert_eq!(d.normalize_request_path("/application"), "/application");
        assert_eq!(d.normalize_request_path("/other"), "/other");
    }

    #[test]
    fn test_outcome_accessors() {
        let handled = Outcome::Handled(HandlerResponse::ok("hi"));
        assert_eq!(handled.body(), "hi");
        assert_eq!(handled.status(), Some(200));

        let aborted = Outcome::Aborted(None);
        assert!(aborted.is_aborted());
        assert_eq!(aborted.body(), "");
        assert_eq!(aborted.status(), None);
        assert_eq!(aborted.into_response(), None);
    }
}
