//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for mrouter.
//!
//! ## Environment Variables
//!
//! ### `MROUTER_BASE_PATH`
//!
//! Prefix stripped from every request path before matching, for deployments
//! where the application is mounted below the document root (e.g. `/app`).
//! Applied by [`Router::with_config`](crate::router::Router::with_config).
//!
//! Default: none
//!
//! ### `MROUTER_MANIFEST`
//!
//! Route manifest used by the CLI when `--manifest` is not given.
//!
//! Default: none
//!
//! ## Usage
//!
//! ```rust
//! use mrouter::runtime_config::RuntimeConfig;
//! use mrouter::router::Router;
//!
//! let config = RuntimeConfig::from_env();
//! let router = Router::with_config(&config);
//! ```
//!
//! ## Example Configuration
//!
//! ```bash
//! export MROUTER_BASE_PATH=/app
//! export MROUTER_MANIFEST=config/routes.toml
//! mrouter routes
//! ```

use std::env;
use std::path::PathBuf;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Base path stripped from request paths (`MROUTER_BASE_PATH`)
    pub base_path: Option<String>,
    /// Default route manifest (`MROUTER_MANIFEST`)
    pub manifest: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        RuntimeConfig {
            base_path: non_empty("MROUTER_BASE_PATH"),
            manifest: non_empty("MROUTER_MANIFEST").map(PathBuf::from),
        }
    }
}
