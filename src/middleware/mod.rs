//! # Middleware Module
//!
//! Named pre-handler checks that can stop a dispatch before the route handler
//! runs.
//!
//! ## Overview
//!
//! - Middleware is registered by name in a [`MiddlewareRegistry`]
//! - Routes are bound to an ordered list of names (from their group, or
//!   explicitly through [`RouteBuilder::middleware`](crate::router::RouteBuilder::middleware))
//! - On dispatch the bound names run in order; a [`Flow::Halt`] or
//!   [`Flow::Respond`] stops the chain and the handler is never invoked
//!
//! Names with no registered middleware are skipped silently.
//!
//! ## Closures
//!
//! Any `Fn() -> R` where `R: Into<Flow>` is a middleware. `false` halts,
//! `true` and `()` continue:
//!
//! ```rust
//! use mrouter::middleware::{Flow, MiddlewareRegistry};
//!
//! let mut registry = MiddlewareRegistry::new();
//! registry.register("deny", || false);
//! registry.register("log", || println!("request seen"));
//! assert!(registry.contains("deny"));
//! ```

mod chain;
mod core;

pub use chain::{ChainResult, MiddlewareRegistry};
pub use core::{Flow, Middleware};
