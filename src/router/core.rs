//! Router core module - hot path for request routing.
//!
//! # JSF Compliance (Rule 206)
//!
//! The match chain is a `SmallVec` so that nesting up to four levels deep
//! (root group, API group, resource group, route) never touches the heap.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use super::group::{RouteGroup, Unwind};
use super::route::Route;
use super::segment::normalize;
use crate::context::{Context, Params};
use crate::error::Result;

/// Maximum nesting depth kept inline in a [`MatchChain`].
pub const MAX_INLINE_DEPTH: usize = 4;

/// Routers traversed by a successful match, outermost first, terminal route last.
pub type MatchChain = SmallVec<[Router; MAX_INLINE_DEPTH]>;

/// Result of resolving a path against a router.
#[derive(Debug, Clone, Default)]
pub struct RouteMatch {
    /// Every router traversed, outermost first
    pub chain: MatchChain,
    /// Parameters captured along the way (innermost capture wins on name clashes)
    pub params: Params,
}

/// The capability shared by routes and groups: match a path, dispatch a request.
///
/// Groups hold `Router`s as children, which is what makes nesting arbitrary.
/// Cloning is cheap (one `Arc` increment).
#[derive(Debug, Clone)]
pub enum Router {
    Route(Arc<Route>),
    Group(Arc<RouteGroup>),
}

impl Router {
    /// Registered path (route) or prefix (group).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Router::Route(r) => r.path(),
            Router::Group(g) => g.path(),
        }
    }

    /// Identity comparison: true only for the very same registered router.
    #[must_use]
    pub fn ptr_eq(&self, other: &Router) -> bool {
        match (self, other) {
            (Router::Route(a), Router::Route(b)) => Arc::ptr_eq(a, b),
            (Router::Group(a), Router::Group(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Resolve already-normalized segments without touching any context.
    #[must_use]
    pub fn resolve(&self, segments: &[&str]) -> Option<RouteMatch> {
        match self {
            Router::Route(route) => {
                let params = route.resolve(segments)?;
                let mut chain = MatchChain::new();
                chain.push(self.clone());
                Some(RouteMatch { chain, params })
            }
            Router::Group(group) => {
                let (mut params, found) = group.resolve(segments)?;
                params.merge(&found.params);
                let mut chain = MatchChain::with_capacity(found.chain.len() + 1);
                chain.push(self.clone());
                chain.extend(found.chain);
                Some(RouteMatch { chain, params })
            }
        }
    }

    /// Test `path` against this router.
    ///
    /// On success the captured parameters are written into `ctx` and the
    /// match chain is recorded for [`Router::dispatch`]. On failure `ctx` is
    /// left untouched. Never errors.
    pub fn matches(&self, path: &str, ctx: &mut Context) -> bool {
        let segments = normalize(path);
        match self.resolve(&segments) {
            Some(found) => {
                trace!(
                    router = %self.path(),
                    path = %path,
                    depth = found.chain.len(),
                    "Path matched"
                );
                ctx.params.merge(&found.params);
                ctx.matched = found.chain;
                true
            }
            None => false,
        }
    }

    /// Dispatch the request recorded in `ctx` by a previous match.
    ///
    /// A route invokes its handler. A group runs its middleware around the
    /// child that follows it in the recorded chain, failing with
    /// [`Error::NoMatch`](crate::Error::NoMatch) if there is none. The `end`
    /// hooks of every entered group run before this returns, innermost first.
    pub fn dispatch(&self, ctx: &mut Context) -> Result {
        let chain = ctx.matched.clone();
        let rest = chain
            .iter()
            .position(|r| r.ptr_eq(self))
            .map_or(&[][..], |i| &chain[i + 1..]);
        let mut unwind = Unwind::new(ctx);
        self.dispatch_chain(rest, &mut unwind)
    }

    pub(crate) fn dispatch_chain<'g>(
        &'g self,
        rest: &'g [Router],
        unwind: &mut Unwind<'g, '_>,
    ) -> Result {
        match self {
            Router::Route(route) => route.dispatch(unwind.ctx),
            Router::Group(group) => group.dispatch_chain(rest, unwind),
        }
    }
}

impl From<Route> for Router {
    fn from(route: Route) -> Self {
        Router::Route(Arc::new(route))
    }
}

impl From<RouteGroup> for Router {
    fn from(group: RouteGroup) -> Self {
        Router::Group(Arc::new(group))
    }
}
