//! # CLI Module
//!
//! Command-line inspection of route manifests.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! Print the route table a manifest produces, in registration order:
//!
//! ```bash
//! mrouter routes --manifest config/routes.toml
//! ```
//!
//! ### `match`
//!
//! Show which route a request would dispatch to, with its captured
//! parameters, middleware and name:
//!
//! ```bash
//! mrouter match --manifest config/routes.toml GET /users/42
//! ```
//!
//! `--manifest` falls back to `MROUTER_MANIFEST`.
//!
//! ## Global Options
//!
//! - `--log-level <LEVEL>` - trace/debug/info/warn/error (env `MROUTER_LOG_LEVEL`)
//! - `--log-format <FORMAT>` - json or pretty (env `MROUTER_LOG_FORMAT`)
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use clap::Parser;
//! use mrouter::cli::{run_cli, Cli};
//!
//! let cli = Cli::parse();
//! run_cli(cli).unwrap();
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{execute, run_cli, Cli, Commands};
