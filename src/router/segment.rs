//! Segment-based path matching.
//!
//! Paths are compared segment by segment, left to right. There is no tree:
//! each registered pattern is tested against the request segments on its own,
//! which keeps matching trivially predictable (first registered match wins).
//!
//! A pattern segment is one of:
//! - a literal (`users`) that must equal the request segment exactly (case-sensitive)
//! - a parameter (`:id`) that matches any single non-empty segment and captures it
//! - a trailing wildcard (`*`) that matches zero or more remaining segments
//!
//! A `*` anywhere but the last position is a literal `*`, never a wildcard.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::warn;

use crate::context::Params;

/// Marker that introduces a parameter segment.
pub const PARAM_MARKER: char = ':';

/// Catch-all segment. Only meaningful as the final segment of a pattern.
pub const WILDCARD: &str = "*";

/// Request path split into its non-empty segments.
pub type Segments<'a> = SmallVec<[&'a str; 8]>;

/// One specifier of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment exactly
    Literal(Arc<str>),
    /// Captures any non-empty request segment under this name
    Param(Arc<str>),
    /// Matches every remaining request segment
    Wildcard,
}

/// Strip leading/trailing separators and drop the empty segments produced by
/// repeated separators, so `"/a//b/"` and `"a/b"` normalize identically.
#[must_use]
pub fn normalize(path: &str) -> Segments<'_> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True if `request` satisfies `pattern` exactly.
///
/// Without a trailing wildcard the segment counts must be equal. With one, the
/// request needs at least as many segments as the pattern minus the wildcard.
#[must_use]
pub fn matches(pattern: &[Segment], request: &[&str]) -> bool {
    match pattern.split_last() {
        Some((Segment::Wildcard, fixed)) => {
            request.len() >= fixed.len() && prefix_matches(fixed, request)
        }
        _ => request.len() == pattern.len() && prefix_matches(pattern, request),
    }
}

/// True if the first `pattern.len()` request segments satisfy `pattern`.
/// Extra request segments are ignored.
#[must_use]
pub fn prefix_matches(pattern: &[Segment], request: &[&str]) -> bool {
    request.len() >= pattern.len()
        && pattern.iter().zip(request).all(|(p, r)| match p {
            Segment::Literal(lit) => lit.as_ref() == *r,
            Segment::Param(_) => !r.is_empty(),
            Segment::Wildcard => true,
        })
}

/// Write each parameter of `pattern` into `params`. Wildcard tails are not captured.
pub fn capture(pattern: &[Segment], request: &[&str], params: &mut Params) {
    for (p, r) in pattern.iter().zip(request) {
        if let Segment::Param(name) = p {
            params.set(Arc::clone(name), *r);
        }
    }
}

/// A parsed route path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse a route path such as `/users/:id/files/*`.
    pub fn parse(path: &str) -> Self {
        Self::build(path, true)
    }

    /// Parse a group prefix. Prefixes never carry a wildcard: a `*` is literal.
    pub fn parse_prefix(path: &str) -> Self {
        Self::build(path, false)
    }

    fn build(path: &str, allow_wildcard: bool) -> Self {
        let parts = normalize(path);
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                if *part == WILDCARD {
                    if allow_wildcard && i == last {
                        return Segment::Wildcard;
                    }
                    warn!(
                        pattern = %path,
                        position = i,
                        "Wildcard is only valid as the final route segment; treating it as a literal"
                    );
                    return Segment::Literal(Arc::from(WILDCARD));
                }
                match part.strip_prefix(PARAM_MARKER) {
                    Some(name) if !name.is_empty() => Segment::Param(Arc::from(name)),
                    _ => Segment::Literal(Arc::from(*part)),
                }
            })
            .collect();

        Self {
            raw: path.to_string(),
            segments,
        }
    }

    /// The path this pattern was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Names of the parameter segments, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_ref()),
            _ => None,
        })
    }

    #[must_use]
    pub fn matches(&self, request: &[&str]) -> bool {
        matches(&self.segments, request)
    }

    #[must_use]
    pub fn prefix_matches(&self, request: &[&str]) -> bool {
        prefix_matches(&self.segments, request)
    }

    pub fn capture(&self, request: &[&str], params: &mut Params) {
        capture(&self.segments, request, params);
    }
}
