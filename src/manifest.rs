//! # Route Manifest Module
//!
//! Declarative route sets in TOML.
//!
//! ## Overview
//!
//! A manifest lists routes and groups the same way code would register them.
//! [`Manifest::apply`] replays it through the ordinary [`Router`] API, so group
//! prefixes, group middleware and builder overwrite rules behave exactly as
//! they do for routes registered in code.
//!
//! Only string handlers can be expressed: `"Name@action"` controller
//! references and view template names. Closures, controllers, middleware
//! implementations and the view renderer still come from code.
//!
//! ## Format
//!
//! ```toml
//! base_path = "/app"
//!
//! [[routes]]
//! method = "GET"
//! path = "/users/{id}"
//! handler = "UserController@show"
//! name = "users.show"
//! data = { title = "User" }
//!
//! [[groups]]
//! prefix = "/admin"
//! middleware = ["auth"]
//!
//! [[groups.routes]]
//! methods = ["GET", "POST"]
//! path = "/settings"
//! handler = "admin/settings"
//! ```
//!
//! Top-level routes are registered before groups. Within a group, its routes
//! come before its nested groups.

use anyhow::{bail, Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::handler::RouteData;
use crate::router::Router;

/// Methods a manifest may name
pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"];

/// A parsed route manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Prefix stripped from request paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Routes outside any group
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Route groups
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// One `[[routes]]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteEntry {
    /// Single method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Several methods sharing the handler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    /// Path template, relative to the enclosing group
    pub path: String,
    /// `"Name@action"` or a view template name
    pub handler: String,
    /// Route name for reverse lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Middleware list; replaces any group middleware on every method's route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middleware: Option<Vec<String>>,
    /// Route metadata, copied to every method's route
    #[serde(default)]
    pub data: RouteData,
}

/// One `[[groups]]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupEntry {
    /// Prefix joined onto the parent group's
    pub prefix: String,
    /// Middleware appended to the parent group's
    #[serde(default)]
    pub middleware: Vec<String>,
    /// Routes in this group
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Nested groups
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

impl RouteEntry {
    fn parsed_methods(&self) -> Result<Vec<Method>> {
        let names: Vec<&str> = match (&self.method, &self.methods) {
            (Some(_), Some(_)) => {
                bail!("Route '{}' sets both 'method' and 'methods'", self.path)
            }
            (Some(m), None) => vec![m.as_str()],
            (None, Some(ms)) => ms.iter().map(String::as_str).collect(),
            (None, None) => bail!("Route '{}' has no method", self.path),
        };
        if names.is_empty() {
            bail!("Route '{}' has an empty 'methods' list", self.path);
        }

        names
            .into_iter()
            .map(|name| {
                let upper = name.trim().to_ascii_uppercase();
                if !SUPPORTED_METHODS.contains(&upper.as_str()) {
                    bail!("Route '{}' uses unknown method '{name}'", self.path);
                }
                Method::from_bytes(upper.as_bytes())
                    .with_context(|| format!("Route '{}' uses invalid method '{name}'", self.path))
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            bail!("Route with handler '{}' has an empty path", self.handler);
        }
        if self.handler.trim().is_empty() {
            bail!("Route '{}' has an empty handler", self.path);
        }
        check_braces(&self.path)?;
        self.parsed_methods()?;
        Ok(())
    }

    fn apply(&self, router: &mut Router) -> Result<usize> {
        let methods = self.parsed_methods()?;
        for method in &methods {
            let mut builder = router.register(
                method.clone(),
                &self.path,
                self.handler.as_str(),
                self.data.clone(),
            );
            if let Some(middleware) = &self.middleware {
                builder = builder.middleware(middleware.as_slice());
            }
            if let Some(name) = &self.name {
                builder.name(name);
            }
        }
        Ok(methods.len())
    }
}

impl GroupEntry {
    fn validate(&self) -> Result<()> {
        check_braces(&self.prefix)?;
        for route in &self.routes {
            route
                .validate()
                .with_context(|| format!("In group '{}'", self.prefix))?;
        }
        for group in &self.groups {
            group
                .validate()
                .with_context(|| format!("In group '{}'", self.prefix))?;
        }
        Ok(())
    }

    fn apply(&self, router: &mut Router) -> Result<usize> {
        router.group(&self.prefix, self.middleware.as_slice(), |r| -> Result<usize> {
            let mut count = 0;
            for route in &self.routes {
                count += route.apply(r)?;
            }
            for group in &self.groups {
                count += group.apply(r)?;
            }
            Ok(count)
        })
    }
}

impl Manifest {
    /// Parse and validate a manifest from TOML text.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML, unknown fields, unknown methods, empty paths
    /// or unbalanced `{}` in a path.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content).context("Failed to parse route manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every route and group
    ///
    /// # Errors
    ///
    /// The first invalid entry found.
    pub fn validate(&self) -> Result<()> {
        for route in &self.routes {
            route.validate()?;
        }
        for group in &self.groups {
            group.validate()?;
        }
        Ok(())
    }

    /// Register everything in the manifest on `router`.
    ///
    /// Sets the base path if the manifest has one. Returns the number of
    /// routes registered (one per method).
    ///
    /// # Errors
    ///
    /// Fails if the manifest does not validate; nothing is registered then.
    pub fn apply(&self, router: &mut Router) -> Result<usize> {
        self.validate()?;

        if let Some(base_path) = &self.base_path {
            router.set_base_path(base_path);
        }

        let mut count = 0;
        for route in &self.routes {
            count += route.apply(router)?;
        }
        for group in &self.groups {
            count += group.apply(router)?;
        }

        info!(routes_count = count, "Route manifest applied");
        Ok(count)
    }

    /// Build a fresh [`Router`] from this manifest
    ///
    /// # Errors
    ///
    /// See [`Manifest::apply`].
    pub fn to_router(&self) -> Result<Router> {
        let mut router = Router::new();
        self.apply(&mut router)?;
        Ok(router)
    }
}

/// Load and validate a manifest file
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse and validate.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read route manifest: {}", path.display()))?;
    let manifest = Manifest::from_toml_str(&content)
        .with_context(|| format!("Invalid route manifest: {}", path.display()))?;
    info!(
        path = %path.display(),
        routes = manifest.routes.len(),
        groups = manifest.groups.len(),
        "Route manifest loaded"
    );
    Ok(manifest)
}

fn check_braces(path: &str) -> Result<()> {
    let mut open = false;
    for c in path.chars() {
        match c {
            '{' if open => bail!("Nested '{{' in path '{path}'"),
            '{' => open = true,
            '}' if !open => bail!("Unmatched '}}' in path '{path}'"),
            '}' => open = false,
            _ => {}
        }
    }
    if open {
        bail!("Unclosed '{{' in path '{path}'");
    }
    Ok(())
}
