//! # Middleware Module
//!
//! Filters that run around the dispatch of a route group.
//!
//! ## Overview
//!
//! Middleware is inserted into a [`RouteGroup`](crate::RouteGroup) (or into the
//! dispatcher's root group for global filters) and wraps every request that
//! matches a route below that group. Each group forms one layer of an onion:
//!
//! ```text
//! G1.pre ─► G2.pre ─► handler ─► G2.post ─► G1.post ─► G2.end ─► G1.end
//! ```
//!
//! - `pre_dispatch` hooks run in insertion order; the first error stops the
//!   chain at that level and skips the handler
//! - `post_dispatch` hooks run after a successful inner dispatch
//! - `end` hooks always run, once per traversed group, innermost first
//!
//! ## Bundled Middleware
//!
//! - [`TracingMiddleware`] - one structured log line per request
//! - [`MetricsMiddleware`] - request, error, latency and per-route counters

mod core;
mod metrics;
mod tracing;

pub use self::core::Middleware;
pub use self::metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
