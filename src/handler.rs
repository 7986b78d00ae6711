//! Route handlers and the values they exchange with the dispatcher.
//!
//! A route's handler is one of three closed variants:
//!
//! - [`Handler::Callable`] - a closure run with the captured [`RouteParams`]
//! - [`Handler::Controller`] - a `"Name@action"` reference resolved through the
//!   [`ControllerRegistry`](crate::registry::ControllerRegistry)
//! - [`Handler::View`] - a template name handed to the installed [`ViewRenderer`]
//!
//! Strings convert with [`Handler::from`]: anything containing `@` is a
//! controller reference, everything else is a view name.

use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::router::ParamVec;

/// Arbitrary per-route metadata, handed to view renderers
pub type RouteData = Map<String, Value>;

/// Maximum inline response headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 4;

/// Response header storage
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Path parameters captured for a matched route
///
/// Values are kept in the order the template declared its placeholders, so
/// handlers can read them positionally (`params[0]`) the same way they would
/// receive positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: ParamVec,
}

impl RouteParams {
    /// Wrap captured parameters
    #[must_use]
    pub fn new(params: ParamVec) -> Self {
        Self { params }
    }

    /// Get a parameter by name
    ///
    /// Uses "last write wins" semantics when a template repeats a name
    /// (e.g. `/org/{id}/user/{id}` returns the user id).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a parameter by declaration position
    #[inline]
    #[must_use]
    pub fn nth(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|(_, v)| v.as_str())
    }

    /// Parameter values in declaration order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, v)| v.as_str())
    }

    /// `(name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Number of captured parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when the route has no placeholders
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl Index<usize> for RouteParams {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        self.params[index].1.as_str()
    }
}

/// Response produced by a handler, a not-found handler or a halting middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderVec,
    /// Response body, written verbatim
    pub body: String,
}

impl HandlerResponse {
    /// Create a response with the given status and body
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: body.into(),
        }
    }

    /// 200 response with a body
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// 302 redirect with an empty body
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(302, String::new());
        response.set_header("location", location.to_string());
        response
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Replace the status code
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

impl From<&str> for HandlerResponse {
    fn from(body: &str) -> Self {
        Self::ok(body)
    }
}

impl From<String> for HandlerResponse {
    fn from(body: String) -> Self {
        Self::ok(body)
    }
}

impl From<()> for HandlerResponse {
    fn from(_: ()) -> Self {
        Self::ok(String::new())
    }
}

/// Boxed handler closure
pub type HandlerFn = Arc<dyn Fn(&RouteParams) -> HandlerResponse + Send + Sync>;

/// Reference to an action on a registered controller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerRef {
    /// Controller name as registered in the controller registry
    pub controller: String,
    /// Action to invoke on the constructed instance
    pub action: String,
}

impl ControllerRef {
    /// Parse `"Name@action"`; `None` when there is no `@`.
    #[must_use]
    pub fn parse(reference: &str) -> Option<Self> {
        let (controller, action) = reference.split_once('@')?;
        Some(Self {
            controller: controller.to_string(),
            action: action.to_string(),
        })
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.action)
    }
}

/// What a route invokes when it matches
#[derive(Clone)]
pub enum Handler {
    /// Closure called with the captured parameters
    Callable(HandlerFn),
    /// Action on a controller constructed per dispatch
    Controller(ControllerRef),
    /// Template rendered with the route's metadata
    View(String),
}

impl Handler {
    /// Wrap a closure as a handler.
    ///
    /// The closure may return anything convertible into a
    /// [`HandlerResponse`]: `&str`, `String`, `()` or a full response.
    pub fn func<F, R>(f: F) -> Self
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
        R: Into<HandlerResponse>,
    {
        Handler::Callable(Arc::new(move |params: &RouteParams| f(params).into()))
    }

    /// Reference an action on a registered controller
    #[must_use]
    pub fn controller(controller: &str, action: &str) -> Self {
        Handler::Controller(ControllerRef {
            controller: controller.to_string(),
            action: action.to_string(),
        })
    }

    /// Render a view template
    #[must_use]
    pub fn view(template: &str) -> Self {
        Handler::View(template.to_string())
    }

    /// Short label used in logs and route dumps
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Handler::Callable(_) => "<closure>".to_string(),
            Handler::Controller(r) => r.to_string(),
            Handler::View(template) => format!("view:{template}"),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<&str> for Handler {
    fn from(reference: &str) -> Self {
        match ControllerRef::parse(reference) {
            Some(r) => Handler::Controller(r),
            None => Handler::View(reference.to_string()),
        }
    }
}

impl From<String> for Handler {
    fn from(reference: String) -> Self {
        Handler::from(reference.as_str())
    }
}

impl From<ControllerRef> for Handler {
    fn from(reference: ControllerRef) -> Self {
        Handler::Controller(reference)
    }
}

impl From<HandlerFn> for Handler {
    fn from(f: HandlerFn) -> Self {
        Handler::Callable(f)
    }
}

/// View-rendering collaborator
///
/// Invoked when a route's handler is a template name. The error string is
/// surfaced as [`RouterError::ViewRender`](crate::error::RouterError::ViewRender).
pub trait ViewRenderer: Send + Sync {
    /// Render `template` with the route's metadata
    fn render(&self, template: &str, data: &RouteData) -> Result<String, String>;
}

impl<F> ViewRenderer for F
where
    F: Fn(&str, &RouteData) -> Result<String, String> + Send + Sync,
{
    fn render(&self, template: &str, data: &RouteData) -> Result<String, String> {
        self(template, data)
    }
}
