use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::debug;

use super::segment::Pattern;
use crate::context::{Context, Params, Request};
use crate::error::{Error, Result};
use crate::resource::ResourceHandler;

/// Header that lets clients unable to issue PUT/PATCH/DELETE tunnel them through POST.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// Method a request should be dispatched as.
///
/// Only a POST may be remapped, and only to PUT, PATCH or DELETE. Any other
/// override value is ignored.
#[must_use]
pub fn effective_method(req: &Request) -> Method {
    if req.method == Method::POST {
        if let Some(over) = req.header(METHOD_OVERRIDE_HEADER) {
            match over.trim().to_ascii_uppercase().as_str() {
                "PUT" => return Method::PUT,
                "PATCH" => return Method::PATCH,
                "DELETE" => return Method::DELETE,
                _ => {}
            }
        }
    }
    req.method.clone()
}

/// One path pattern bound to one resource handler.
///
/// Immutable once built. Matching is exact: there are no optional segments,
/// register the same handler under several routes instead.
pub struct Route {
    path: String,
    pattern: Pattern,
    handler: Arc<dyn ResourceHandler>,
}

impl Route {
    pub fn new(path: &str, handler: Arc<dyn ResourceHandler>) -> Self {
        Self {
            path: path.to_string(),
            pattern: Pattern::parse(path),
            handler,
        }
    }

    /// Route registered inside a group. `path()` reports the prefixed path.
    pub(crate) fn with_prefix(prefix: &str, path: &str, handler: Arc<dyn ResourceHandler>) -> Self {
        let mut route = Self::new(path, handler);
        route.path = collapse_slashes(&format!("{prefix}/{path}"));
        route
    }

    /// Registered path, including the prefix of the group it was added to.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ResourceHandler> {
        &self.handler
    }

    /// Match normalized request segments, returning the captured parameters.
    pub(crate) fn resolve(&self, segments: &[&str]) -> Option<Params> {
        if !self.pattern.matches(segments) {
            return None;
        }
        let mut params = Params::new();
        self.pattern.capture(segments, &mut params);
        Some(params)
    }

    /// Invoke the handler method for the request's (possibly overridden) verb.
    pub fn dispatch(&self, ctx: &mut Context) -> Result {
        let method = effective_method(&ctx.request);
        debug!(
            request_id = %ctx.request_id(),
            route = %self.path,
            method = %method,
            "Route dispatch"
        );

        let h = self.handler.as_ref();
        match method.as_str() {
            "GET" => h.get(ctx),
            "POST" => h.post(ctx),
            "PUT" => h.put(ctx),
            "PATCH" => h.patch(ctx),
            "DELETE" => h.delete(ctx),
            "OPTIONS" => h.options(ctx),
            "HEAD" => h.head(ctx),
            "TRACE" => h.trace(ctx),
            "CONNECT" => h.connect(ctx),
            _ => Err(Error::MethodNotImplemented),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for seg in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(seg);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
