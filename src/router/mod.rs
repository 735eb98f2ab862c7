//! # Router Module
//!
//! Path matching and route resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing registered paths into segment patterns ([`Pattern`])
//! - Matching request paths against routes and nested route groups
//! - Capturing path parameters into the request [`Context`](crate::Context)
//! - Dispatching the matched route through every traversed group's middleware
//!
//! ## Architecture
//!
//! [`Router`] is a tagged union over [`Route`] (one pattern bound to one
//! resource handler) and [`RouteGroup`] (a prefix, a middleware chain and an
//! ordered list of child routers). Both expose the same two operations:
//!
//! 1. **Match**: `matches(path, ctx) -> bool` normalizes the path, walks the
//!    children in registration order (first match wins) and records the chain
//!    of routers it went through, root to terminal route, in the context.
//!
//! 2. **Dispatch**: `dispatch(ctx)` replays that chain. Each group runs its
//!    `pre_dispatch` hooks, dispatches the next router in the chain, then its
//!    `post_dispatch` hooks. The `end` hooks of every entered group run once
//!    the outermost level is done, innermost first, on success, error or panic.
//!    For `G1 { G2 { R } }` a successful request produces
//!    `G1.pre, G2.pre, R, G2.post, G1.post, G2.end, G1.end`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use restroute::{Context, Request, ResourceHandler, Result, RouteGroup, Router};
//!
//! struct Pet;
//! impl ResourceHandler for Pet {
//!     fn get(&self, ctx: &mut Context) -> Result {
//!         let id = ctx.param("id").to_string();
//!         ctx.render(&id);
//!         Ok(())
//!     }
//! }
//!
//! let mut api = RouteGroup::new("/v1");
//! api.add("/pets/:id", Arc::new(Pet));
//! let router = Router::from(api);
//!
//! let mut ctx = Context::new(Request::new(Method::GET, "/v1/pets/7"));
//! assert!(router.matches("/v1/pets/7", &mut ctx));
//! assert_eq!(ctx.param("id"), "7");
//! assert!(router.dispatch(&mut ctx).is_ok());
//! assert_eq!(ctx.response.body_str(), "7");
//! ```
//!
//! ## Performance
//!
//! Matching is a linear scan of each group's children with segment-by-segment
//! comparison: O(routes × segments) per uncached lookup. Repeated paths are
//! served from the [`RouteCache`](crate::route_cache::RouteCache) instead.

mod core;
mod group;
mod route;
mod segment;

pub use self::core::{MatchChain, RouteMatch, Router, MAX_INLINE_DEPTH};
pub use group::RouteGroup;
pub use route::{effective_method, Route, METHOD_OVERRIDE_HEADER};
pub use segment::{
    capture, matches, normalize, prefix_matches, Pattern, Segment, Segments, PARAM_MARKER,
    WILDCARD,
};
