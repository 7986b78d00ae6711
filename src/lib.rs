//! # mrouter
//!
//! **mrouter** is a small, ordered URL-path router: `{name}` path templates,
//! route groups with shared prefixes and middleware, short-circuiting
//! middleware chains, named routes and a configurable not-found handler.
//!
//! ## Overview
//!
//! Routes are registered on a mutable [`Router`](router::Router) and then
//! frozen into an immutable [`Dispatcher`](dispatcher::Dispatcher) that can be
//! shared across threads. Dispatch is first-match-wins in registration order.
//!
//! ## Architecture
//!
//! - **[`router`]** - Route registration, groups, the fluent route builder and
//!   path-template compilation
//! - **[`dispatcher`]** - Request-path normalization, matching, middleware
//!   execution and handler invocation
//! - **[`middleware`]** - Named middleware and the short-circuiting chain runner
//! - **[`handler`]** - Handler variants, captured parameters and responses
//! - **[`registry`]** - Controllers resolved from `"Name@action"` references
//! - **[`request`]** - Request context from the hosting environment
//! - **[`service`]** - Runtime replacement of the whole route set
//! - **[`manifest`]** - Declarative route sets in TOML
//! - **[`hot_reload`]** - Live reloading of a route manifest
//! - **[`logging`]** - Structured logging setup
//! - **[`runtime_config`]** - Environment-based configuration
//! - **[`cli`]** - The `mrouter` command-line tool
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Dispatcher
//!     participant Cache as PatternCache
//!     participant Chain as MiddlewareRegistry
//!     participant Handler
//!
//!     Host->>Dispatcher: dispatch(GET, "/user/99?tab=posts")
//!     Dispatcher->>Dispatcher: normalize path<br/>("/user/99")
//!     loop routes for GET, registration order
//!         Dispatcher->>Cache: get_or_compile(template)
//!         Cache-->>Dispatcher: CompiledPattern
//!         Dispatcher->>Dispatcher: captures(path)
//!     end
//!     alt no route matched
//!         Dispatcher-->>Host: Outcome::NotFound (404)
//!     else matched
//!         Dispatcher->>Chain: run(route middleware)
//!         alt a middleware halted
//!             Chain-->>Dispatcher: Halted
//!             Dispatcher-->>Host: Outcome::Aborted
//!         else chain completed
//!             Dispatcher->>Handler: call(params)
//!             Handler-->>Dispatcher: HandlerResponse
//!             Dispatcher-->>Host: Outcome::Handled
//!         end
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use mrouter::handler::Handler;
//! use mrouter::router::Router;
//!
//! let mut router = Router::new();
//! router.register_middleware("auth", || false);
//!
//! router.get("/hello", Handler::func(|_| "Hello World"));
//! router.get("/user/{id}", Handler::func(|p| format!("User:{}", &p[0])));
//! router.group("/admin", &["auth"], |r| {
//!     r.get("/dashboard", Handler::func(|_| "Admin Dashboard"));
//! });
//!
//! let dispatcher = router.into_dispatcher();
//!
//! let outcome = dispatcher.dispatch(&Method::GET, "/user/99").unwrap();
//! assert_eq!(outcome.body(), "User:99");
//!
//! let outcome = dispatcher.dispatch(&Method::GET, "/admin/dashboard").unwrap();
//! assert!(outcome.is_aborted());
//!
//! let outcome = dispatcher.dispatch(&Method::GET, "/missing").unwrap();
//! assert_eq!(outcome.status(), Some(404));
//! ```
//!
//! ## Features
//!
//! - **Ordered matching**: earliest registered route wins, no specificity ranking
//! - **Groups**: prefixes and middleware compose through nesting
//! - **Short-circuiting middleware**: `false` (or a response) stops dispatch
//! - **Named routes**: reverse lookup and URL building with [`Dispatcher::url_for`](dispatcher::Dispatcher::url_for)
//! - **Controllers and views**: `"Name@action"` and template handlers resolved at dispatch
//! - **Hot reload**: swap in a new route set from a manifest without restarting

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod hot_reload;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod registry;
pub mod request;
pub mod router;
pub mod runtime_config;
pub mod service;

pub use dispatcher::{Dispatcher, Outcome, RouteMatch};
pub use error::RouterError;
pub use handler::{Handler, HandlerResponse, RouteData, RouteParams, ViewRenderer};
pub use middleware::{Flow, Middleware};
pub use router::{RouteBuilder, Router};
pub use service::RouterService;
