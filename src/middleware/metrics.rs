use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use smallvec::SmallVec;

use super::Middleware;
use crate::context::Context;
use crate::error::Result;

/// Per-request state of one metrics instance.
#[derive(Clone, Copy)]
struct Frame {
    owner: usize,
    started: Instant,
    completed: bool,
}

/// Open frames of every metrics instance on the request, outermost first.
///
/// Instances at different nesting levels share the request, so each one
/// finds its own frame by address. The same instance registered twice gets
/// one frame per level, matched up in LIFO order.
#[derive(Clone, Default)]
struct MetricsFrames(SmallVec<[Frame; 4]>);

/// Middleware for collecting request metrics
///
/// Counts requests, failed requests, total latency and per-route hits. All
/// counters are relaxed atomics; per-route counts live in a `DashMap` keyed by
/// the matched route's registered path, so `/pets/:id` is one series however
/// many ids are requested.
///
/// A request counts as failed when its dispatch did not reach this group's
/// `post_dispatch`: a pre hook, the handler or an inner post hook errored.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use restroute::middleware::MetricsMiddleware;
/// use restroute::Dispatcher;
///
/// let metrics = Arc::new(MetricsMiddleware::new());
/// let dispatcher = Dispatcher::builder()
///     .insert(Arc::clone(&metrics) as _)
///     .build();
/// assert_eq!(metrics.request_count(), 0);
/// # drop(dispatcher);
/// ```
#[derive(Debug, Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    error_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    route_hits: DashMap<String, u64>,
}

impl MetricsMiddleware {
    /// Create a new metrics middleware with all counters initialized to zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    /// Total number of requests that entered this middleware
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Number of requests whose dispatch failed
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Mean time between `pre_dispatch` and `end`.
    ///
    /// Returns zero duration if no requests have been processed yet.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Hits recorded for a registered route path, e.g. `/pets/:id`.
    #[must_use]
    pub fn route_count(&self, route: &str) -> u64 {
        self.route_hits.get(route).map_or(0, |v| *v)
    }

    /// Snapshot of every per-route counter, sorted by path.
    #[must_use]
    pub fn route_counts(&self) -> Vec<(String, u64)> {
        let mut out: Vec<(String, u64)> = self
            .route_hits
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect();
        out.sort();
        out
    }
}

impl Middleware for MetricsMiddleware {
    fn pre_dispatch(&self, ctx: &mut Context) -> Result {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let frame = Frame {
            owner: self.key(),
            started: Instant::now(),
            completed: false,
        };
        match ctx.data.get_mut::<MetricsFrames>() {
            Some(frames) => frames.0.push(frame),
            None => {
                let mut frames = MetricsFrames::default();
                frames.0.push(frame);
                ctx.data.insert(frames);
            }
        }

        let route = ctx.route().map_or("", |r| r.path());
        *self.route_hits.entry(route.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn post_dispatch(&self, ctx: &mut Context) -> Result {
        let key = self.key();
        if let Some(frame) = ctx
            .data
            .get_mut::<MetricsFrames>()
            .and_then(|frames| frames.0.iter_mut().rev().find(|f| f.owner == key && !f.completed))
        {
            frame.completed = true;
        }
        Ok(())
    }

    fn end(&self, ctx: &mut Context) -> Result {
        let key = self.key();
        let Some(frames) = ctx.data.get_mut::<MetricsFrames>() else {
            return Ok(());
        };
        // A pre hook earlier in this group's chain failed before ours ran.
        let Some(pos) = frames.0.iter().rposition(|f| f.owner == key) else {
            return Ok(());
        };
        let frame = frames.0.remove(pos);

        let elapsed = u64::try_from(frame.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.total_latency_ns.fetch_add(elapsed, Ordering::Relaxed);
        if !frame.completed {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}
