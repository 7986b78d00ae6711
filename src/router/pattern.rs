//! Path template compilation and the pattern cache.
//!
//! Templates are made of `/`-separated segments. A segment written exactly as
//! `{name}` is a placeholder that captures one non-empty path segment; every
//! other segment is compared literally. There is no regex engine involved: a
//! template compiles to a flat list of [`Segment`] descriptors and matching is
//! a single pass over the request path.
//!
//! Trailing slashes are optional on both sides. `/users/` and `/users` compile
//! to the same matcher, and both request paths match it.

use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 placeholders (e.g. `/users/{id}/posts/{slug}`).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated capture storage, in template declaration order.
///
/// Names are `Arc<str>` because they come from the compiled template and are
/// shared by every match against it; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One compiled template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment byte for byte
    Literal(Box<str>),
    /// Captures any non-empty request segment under this name
    Param(Arc<str>),
}

/// Matcher produced from a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    template: String,
    segments: Vec<Segment>,
    param_names: Vec<Arc<str>>,
}

impl CompiledPattern {
    /// Compile a template such as `/user/{id}/post/{slug}`.
    ///
    /// Compilation never fails; a segment that is not exactly `{name}` is a
    /// literal, braces included.
    #[must_use]
    pub fn compile(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut param_names = Vec::new();

        for part in split_segments(template) {
            match placeholder_name(part) {
                Some(name) => {
                    let name: Arc<str> = Arc::from(name);
                    param_names.push(Arc::clone(&name));
                    segments.push(Segment::Param(name));
                }
                None => segments.push(Segment::Literal(Box::from(part))),
            }
        }

        Self {
            template: template.to_string(),
            segments,
            param_names,
        }
    }

    /// The template this pattern was compiled from
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Compiled segment descriptors
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in declaration order
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Match a request path, returning captures in declaration order.
    ///
    /// The path must have exactly as many segments as the template (after
    /// trailing slashes are dropped), literals must be equal and every
    /// placeholder must capture a non-empty segment.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let mut parts = split_segments(path);
        let mut params = ParamVec::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if part != literal.as_ref() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.push((Arc::clone(name), part.to_string()));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// True if `path` matches this pattern
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }
}

/// Lazily populated cache of compiled templates
///
/// Keyed by the raw template string. Entries are never invalidated: templates
/// are static for the lifetime of a route table. Safe to share between
/// dispatching threads.
#[derive(Debug, Default)]
pub struct PatternCache {
    patterns: DashMap<String, Arc<CompiledPattern>>,
}

impl PatternCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled pattern for `template`, compiling it on first use.
    pub fn get_or_compile(&self, template: &str) -> Arc<CompiledPattern> {
        if let Some(pattern) = self.patterns.get(template) {
            return Arc::clone(pattern.value());
        }

        let entry = self
            .patterns
            .entry(template.to_string())
            .or_insert_with(|| {
                let pattern = CompiledPattern::compile(template);
                debug!(
                    template = %template,
                    params = ?pattern.param_names(),
                    "Pattern compiled"
                );
                Arc::new(pattern)
            });
        Arc::clone(entry.value())
    }

    /// Number of compiled templates held
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if nothing has been compiled yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if `template` has already been compiled
    #[must_use]
    pub fn contains(&self, template: &str) -> bool {
        self.patterns.contains_key(template)
    }
}

/// Split a path into segments, ignoring one leading `/` and any trailing `/`.
///
/// The root path (`/` or empty) has no segments. Interior empty segments
/// (`/a//b`) are kept so they can only match literally.
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.trim_end_matches('/');
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let parts = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.split('/'))
    };
    parts.into_iter().flatten()
}

fn placeholder_name(segment: &str) -> Option<&str> {
    let name = segment.strip_prefix('{')?.strip_suffix('}')?;
    if name.is_empty() || name.contains(['{', '}']) {
        return None;
    }
    Some(name)
}
