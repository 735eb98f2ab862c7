//! # restroute
//!
//! **restroute** is a request-routing and dispatch engine for HTTP resource APIs.
//! It maps a request path and method to a resource handler, extracts path
//! parameters, runs per-group middleware around the handler and caches routing
//! decisions for repeated paths.
//!
//! ## Overview
//!
//! The library is organized into a few modules:
//!
//! - **[`router`]** - Segment matching, routes, nested route groups and onion dispatch
//! - **[`dispatcher`]** - The per-request entry point: cache lookup, matching, error translation
//! - **[`context`]** - Per-request state: request, response, captured params, typed data
//! - **[`middleware`]** - The middleware capability plus bundled tracing and metrics filters
//! - **[`resource`]** - The resource handler capability (one method per HTTP verb)
//! - **[`route_cache`]** - Concurrent path → match memo
//! - **[`error`]** - Error taxonomy and HTTP classification
//! - **[`config`]** - Dispatcher switches from env vars or TOML
//! - **[`logging`]** - Default `tracing` subscriber setup
//!
//! ## Path Patterns
//!
//! | Segment | Matches |
//! |---|---|
//! | `users` | exactly `users` (case-sensitive) |
//! | `:id` | any single non-empty segment, captured as `id` |
//! | `*` (last only) | zero or more remaining segments, not captured |
//!
//! Leading, trailing and repeated `/` are ignored. Routers are tried in
//! registration order and the first match wins; there is no specificity
//! ranking.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use restroute::middleware::TracingMiddleware;
//! use restroute::{Context, Dispatcher, Request, ResourceHandler, Result, RouteGroup};
//!
//! struct Pets;
//!
//! impl ResourceHandler for Pets {
//!     fn get(&self, ctx: &mut Context) -> Result {
//!         let id = ctx.param("id").to_string();
//!         ctx.render_json(&serde_json::json!({ "id": id }))
//!     }
//! }
//!
//! let mut api = RouteGroup::new("/api/v1");
//! api.insert(Arc::new(TracingMiddleware::new()));
//! api.add("/pets/:id", Arc::new(Pets));
//!
//! let dispatcher = Dispatcher::builder().add_group(api).build();
//!
//! let res = dispatcher.serve(Request::new(Method::GET, "/api/v1/pets/42"));
//! assert_eq!(res.status(), 200);
//! assert_eq!(res.body_str(), r#"{"id":"42"}"#);
//!
//! let res = dispatcher.serve(Request::new(Method::DELETE, "/api/v1/pets/42"));
//! assert_eq!(res.status(), 405);
//!
//! let res = dispatcher.serve(Request::new(Method::GET, "/nowhere"));
//! assert_eq!(res.status(), 404);
//! ```
//!
//! ## Hosting
//!
//! The engine does not listen on sockets. A host transport converts its
//! request with [`Request::from_http`] (or builds one with [`Request::new`]),
//! calls [`Dispatcher::serve`] and writes back [`Response::into_http`].
//!
//! ## Logging
//!
//! Every diagnostic is a structured `tracing` event. Call
//! [`logging::init_logging`] once at startup, or install your own subscriber.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod resource;
pub mod route_cache;
pub mod router;

pub use config::DispatcherConfig;
pub use context::{Context, HeaderVec, Params, Request, Response};
pub use dispatcher::{Dispatcher, DispatcherBuilder, FollowHandler, PanicPayload};
pub use error::{Error, HttpError, Result};
pub use ids::RequestId;
pub use middleware::Middleware;
pub use resource::ResourceHandler;
pub use route_cache::{CacheEntry, RouteCache};
pub use router::{Route, RouteGroup, Router};
