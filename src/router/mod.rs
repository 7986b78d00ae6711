//! # Router Module
//!
//! Route registration, grouping and path-template compilation.
//!
//! ## Overview
//!
//! The router is the registration half of the crate. It is responsible for:
//! - Storing routes per HTTP method in registration order
//! - Composing group prefixes and group middleware
//! - Binding middleware names to individual routes
//! - Keeping the named-route table used for reverse lookups
//! - Compiling `{name}` path templates into segment matchers
//!
//! ## Architecture
//!
//! The router uses a two-phase approach:
//!
//! 1. **Registration**: a mutable [`Router`] collects routes, groups, middleware,
//!    controllers and the not-found handler.
//!
//! 2. **Dispatch**: [`Router::into_dispatcher`] freezes everything into an
//!    immutable [`Dispatcher`](crate::dispatcher::Dispatcher) that can be shared
//!    across threads. Templates are compiled lazily on first dispatch and kept
//!    in a [`PatternCache`].
//!
//! Match priority is registration order: the first registered route whose
//! template matches wins, even if a later route is more specific.
//!
//! ## Example
//!
//! ```rust
//! use mrouter::handler::Handler;
//! use mrouter::router::Router;
//!
//! let mut router = Router::new();
//! router.get("/", Handler::func(|_| "home"));
//! router.group("/admin", &["auth"], |r| {
//!     r.get("/dashboard", Handler::func(|_| "Admin Dashboard"))
//!         .name("admin.dashboard");
//! });
//!
//! assert_eq!(router.named_route("admin.dashboard"), Some("/admin/dashboard"));
//! ```

mod builder;
mod core;
mod pattern;
#[cfg(test)]
mod tests;

pub use builder::RouteBuilder;
pub use core::{GroupContext, Route, Router};
pub use pattern::{CompiledPattern, ParamVec, PatternCache, Segment, MAX_INLINE_PARAMS};

pub(crate) use core::normalize_uri;
