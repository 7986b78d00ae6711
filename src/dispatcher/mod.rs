//! # Dispatcher Module
//!
//! Resolves requests against a frozen route set and runs the winning route.
//!
//! ## Overview
//!
//! The dispatcher is the read-only half of the crate. It:
//! - Normalizes the request path (query string, base path, trailing slash)
//! - Scans the routes for the request method in registration order
//! - Runs the matched route's middleware chain, stopping on the first halt
//! - Invokes the handler (closure, controller action or view template)
//! - Falls back to the not-found handler, or a default 404 body
//!
//! ## Request Flow
//!
//! 1. [`Router::into_dispatcher`](crate::router::Router::into_dispatcher) freezes
//!    the registration state
//! 2. [`Dispatcher::dispatch`] receives a method and raw request URI
//! 3. The first route whose template matches wins; captures are handed to the
//!    handler in declaration order
//! 4. The result is an [`Outcome`]; the caller decides how to emit it
//!
//! ## Error Handling
//!
//! Configuration mistakes that only show up at dispatch time (unknown
//! controller, unknown action, view without a renderer) are returned as
//! [`RouterError`](crate::error::RouterError) instead of producing silent
//! empty output. A middleware halt is not an error: it is
//! [`Outcome::Aborted`].
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use mrouter::handler::Handler;
//! use mrouter::router::Router;
//!
//! let mut router = Router::new();
//! router.get("/user/{id}", Handler::func(|p| format!("User:{}", &p[0])));
//! let dispatcher = router.into_dispatcher();
//!
//! let outcome = dispatcher.dispatch(&Method::GET, "/user/99?tab=posts").unwrap();
//! assert_eq!(outcome.body(), "User:99");
//! ```

mod core;

pub use core::{Dispatcher, Outcome, RouteMatch};
