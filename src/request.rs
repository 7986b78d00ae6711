//! Request context supplied by the hosting environment.
//!
//! The dispatcher only needs a method and a raw request URI. [`RequestSource`]
//! is the seam for whatever hosts the router; [`CgiRequest`] reads them from
//! CGI-style variables (`REQUEST_METHOD`, `REQUEST_URI`, `HTTP_HOST`, `HTTPS`)
//! and adds the path helpers handlers commonly want.

use anyhow::{Context, Result};
use http::Method;
use std::env;

/// Where the dispatcher gets the current request from
pub trait RequestSource {
    /// Request method
    fn method(&self) -> &Method;
    /// Raw request URI, query string included
    fn request_uri(&self) -> &str;
}

/// Request described by CGI-style environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiRequest {
    method: Method,
    request_uri: String,
    host: Option<String>,
    https: bool,
}

impl CgiRequest {
    /// Build a request from a method and URI
    #[must_use]
    pub fn new(method: Method, request_uri: &str) -> Self {
        Self {
            method,
            request_uri: request_uri.to_string(),
            host: None,
            https: false,
        }
    }

    /// Set the `Host` used by [`CgiRequest::full_url`]
    #[must_use]
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Mark the request as served over TLS
    #[must_use]
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Read the request from the process environment.
    ///
    /// # Errors
    ///
    /// Fails if `REQUEST_METHOD` is not a valid HTTP method.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the request through an arbitrary variable lookup.
    ///
    /// Missing `REQUEST_METHOD` means `GET`, missing `REQUEST_URI` means `/`.
    /// `HTTPS` counts as on unless it is absent, empty or `off`.
    ///
    /// # Errors
    ///
    /// Fails if `REQUEST_METHOD` is not a valid HTTP method.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let method = match lookup("REQUEST_METHOD") {
            Some(m) => Method::from_bytes(m.trim().to_ascii_uppercase().as_bytes())
                .with_context(|| format!("Invalid REQUEST_METHOD: {m:?}"))?,
            None => Method::GET,
        };
        let request_uri = lookup("REQUEST_URI")
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| "/".to_string());
        let https = lookup("HTTPS").is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("off"));

        Ok(Self {
            method,
            request_uri,
            host: lookup("HTTP_HOST").filter(|h| !h.is_empty()),
            https,
        })
    }

    /// Path component of the request URI, `/` if empty
    #[must_use]
    pub fn path(&self) -> &str {
        let path = self
            .request_uri
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if path.is_empty() {
            "/"
        } else {
            path
        }
    }

    /// Non-empty path segments, optionally last-first
    #[must_use]
    pub fn segments(&self, reverse: bool) -> Vec<&str> {
        let mut segments: Vec<&str> = self.path().split('/').filter(|s| !s.is_empty()).collect();
        if reverse {
            segments.reverse();
        }
        segments
    }

    /// Segment at a 1-based `level`, counted from the end when `from_end`
    #[must_use]
    pub fn segment(&self, level: usize, from_end: bool) -> Option<&str> {
        let index = level.checked_sub(1)?;
        self.segments(from_end).get(index).copied()
    }

    /// Scheme, host and request URI, host defaulting to `localhost`
    #[must_use]
    pub fn full_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        let host = self.host.as_deref().unwrap_or("localhost");
        format!("{scheme}://{host}{}", self.request_uri)
    }
}

impl RequestSource for CgiRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn request_uri(&self) -> &str {
        &self.request_uri
    }
}
