use std::time::Instant;

use tracing::{debug, info};

use super::Middleware;
use crate::context::Context;
use crate::error::Result;

/// Start of the outermost traced dispatch level.
#[derive(Clone, Copy)]
struct TraceStart(Instant);

/// Set by `post_dispatch` once the wrapped dispatch succeeded.
#[derive(Clone, Copy)]
struct TraceCompleted;

/// Request logger.
///
/// Logs one `info` event per request from its `end` hook, so failed requests
/// are logged too. Fields: `request_id`, `method`, `path`, `route`, `status`,
/// `completed`, `latency_us` and the captured `params`.
///
/// `status` is the status written so far; error statuses are applied by the
/// dispatcher after the whole chain has unwound, which is why `completed` is
/// reported alongside it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMiddleware;

impl TracingMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TracingMiddleware {
    fn pre_dispatch(&self, ctx: &mut Context) -> Result {
        if ctx.data.get::<TraceStart>().is_none() {
            ctx.data.insert(TraceStart(Instant::now()));
        }
        debug!(
            request_id = %ctx.request_id(),
            method = %ctx.request.method,
            path = %ctx.request.path,
            "Request started"
        );
        Ok(())
    }

    fn post_dispatch(&self, ctx: &mut Context) -> Result {
        ctx.data.insert(TraceCompleted);
        Ok(())
    }

    fn end(&self, ctx: &mut Context) -> Result {
        let Some(TraceStart(started)) = ctx.data.remove::<TraceStart>() else {
            // Already logged by an inner level of the same chain.
            return Ok(());
        };
        let completed = ctx.data.get::<TraceCompleted>().is_some();
        let params: Vec<String> = ctx.params.iter().map(|(k, v)| format!("{k}={v}")).collect();

        info!(
            request_id = %ctx.request_id(),
            method = %ctx.request.method,
            path = %ctx.request.path,
            route = ctx.route().map(|r| r.path()).unwrap_or(""),
            status = ctx.response.status(),
            completed,
            latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
            params = ?params,
            "Request handled"
        );
        Ok(())
    }
}
