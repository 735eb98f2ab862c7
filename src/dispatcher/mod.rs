//! # Dispatcher Module
//!
//! The engine's entry point: one [`Dispatcher`] per service, shared by every
//! worker of the host transport.
//!
//! ## Request Flow
//!
//! For each request [`Dispatcher::serve`]:
//!
//! 1. Creates a fresh [`Context`](crate::Context)
//! 2. On a route cache hit, restores the cached parameters and match chain
//!    and dispatches directly
//! 3. On a miss, matches the path against the top-level routers in
//!    registration order, caches a successful match, then dispatches
//! 4. When nothing matches, forwards to the follow handler if one is set,
//!    otherwise fails with a 404
//! 5. Translates any dispatch error into the response (see below)
//!
//! ## Error Translation
//!
//! | Error | Status | Body (debug mode only) |
//! |---|---|---|
//! | no route matched | 404 | `Not found` |
//! | handler lacks the verb | 405 | `Method not implemented` |
//! | [`HttpError`](crate::HttpError) | its own | its own |
//! | anything else | 500 | the original message |
//!
//! Error bodies are written only when `debug` is on and `silent` is off. The
//! status is always applied. Errors are logged at `warn` (4xx) or `error` (5xx)
//! with their internal identifier. A custom `not_found` hook, if set, replaces
//! the rendering of every 404.
//!
//! ## Panic Recovery
//!
//! With a panic handler installed the whole of request handling runs under
//! `catch_unwind`. The panic is logged, passed to the hook and answered with a
//! bare 500. Every traversed group's `end` hooks still run while unwinding.
//!
//! ## Concurrency
//!
//! The dispatcher is `Send + Sync` and read-only after [`DispatcherBuilder::build`];
//! only the [`RouteCache`](crate::RouteCache) takes a lock, and only briefly.
//! There is no cross-request mutable state, so requests never block each other.

mod builder;
mod core;

pub use self::builder::DispatcherBuilder;
pub use self::core::{
    panic_message, Dispatcher, FollowHandler, NotFoundHook, PanicHook, PanicPayload,
};
