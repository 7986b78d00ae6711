//! # Hot Reload Module
//!
//! Live reloading of a route manifest without restarting the host.
//!
//! ## Overview
//!
//! [`watch_manifest`] watches a TOML manifest and, on every change:
//! 1. **Parse** - the manifest is loaded and validated
//! 2. **Build** - a fresh [`Router`] is created, the caller's `build` hook
//!    registers everything code-only (controllers, middleware, view renderer,
//!    not-found handler), then the manifest routes are applied
//! 3. **Swap** - the frozen dispatcher replaces the one in the
//!    [`RouterService`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mrouter::hot_reload::watch_manifest;
//! use mrouter::service::RouterService;
//! use mrouter::router::Router;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let service = Arc::new(RouterService::from_router(Router::new()));
//! let _watcher = watch_manifest("routes.toml", Arc::clone(&service), |router| {
//!     router.register_middleware("auth", || true);
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! The returned watcher stops watching when dropped.
//!
//! ## Error Handling
//!
//! If the new manifest fails to load or validate, the error is logged and
//! the previous route set stays active.

use anyhow::{Context, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::manifest::load_manifest;
use crate::router::Router;
use crate::service::RouterService;

/// Build a dispatcher-ready router from a manifest file and the caller's hook
///
/// # Errors
///
/// Fails if the manifest cannot be loaded or applied.
pub fn rebuild_router<F>(path: &Path, build: &F) -> Result<Router>
where
    F: Fn(&mut Router),
{
    let manifest = load_manifest(path)?;
    let mut router = Router::new();
    build(&mut router);
    manifest.apply(&mut router)?;
    Ok(router)
}

/// Watch `path` and replace the route set in `service` when it changes.
///
/// # Errors
///
/// Fails if the watcher cannot be created or the path cannot be watched.
pub fn watch_manifest<P, F>(
    path: P,
    service: Arc<RouterService>,
    build: F,
) -> Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: Fn(&mut Router) + Send + 'static,
{
    let path: PathBuf = path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match rebuild_router(&watch_path, &build) {
                    Ok(router) => {
                        info!(
                            path = %watch_path.display(),
                            routes_count = router.len(),
                            "hot-reload: applying route updates"
                        );
                        service.replace(router.into_dispatcher());
                    }
                    Err(e) => {
                        error!(
                            path = %watch_path.display(),
                            error = %format!("{e:#}"),
                            "hot-reload: manifest rejected, keeping previous routes"
                        );
                    }
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )
    .context("Failed to create manifest watcher")?;

    watcher
        .watch(&path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", path.display()))?;
    info!(path = %path.display(), "hot-reload: watching route manifest");
    Ok(watcher)
}
