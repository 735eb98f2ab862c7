use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::DispatcherConfig;
use crate::context::{Context, Request, Response};
use crate::error::{Error, Result};
use crate::route_cache::{CacheEntry, RouteCache};
use crate::router::Router;

use super::builder::DispatcherBuilder;

/// Payload of a caught panic, as produced by `std::panic::catch_unwind`.
pub type PanicPayload = dyn Any + Send;

/// Hook invoked with the payload of a panic raised while serving a request.
pub type PanicHook = Arc<dyn Fn(&PanicPayload) + Send + Sync>;

/// Custom responder for requests that end in a 404.
pub type NotFoundHook = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// External handler that receives requests no route matched.
///
/// Implemented for every `Fn(&mut Context) + Send + Sync`, so a closure is
/// enough in most cases.
pub trait FollowHandler: Send + Sync {
    fn serve(&self, ctx: &mut Context);
}

impl<F> FollowHandler for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn serve(&self, ctx: &mut Context) {
        self(ctx);
    }
}

/// Entry point of the engine: turns a [`Request`] into a [`Response`].
///
/// Built once through [`Dispatcher::builder`] and immutable afterwards; share
/// it behind an `Arc` between the transport's worker threads. Only the route
/// cache mutates while serving.
pub struct Dispatcher {
    pub(super) root: Router,
    pub(super) config: DispatcherConfig,
    pub(super) cache: Arc<RouteCache>,
    pub(super) follow: Option<Arc<dyn FollowHandler>>,
    pub(super) not_found: Option<NotFoundHook>,
    pub(super) panic_handler: Option<PanicHook>,
}

impl Dispatcher {
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// The route cache backing this dispatcher.
    #[must_use]
    pub fn cache(&self) -> &Arc<RouteCache> {
        &self.cache
    }

    /// The implicit root group holding every top-level router and the global middleware.
    #[must_use]
    pub fn root(&self) -> &Router {
        &self.root
    }

    /// Serve one request.
    ///
    /// With a panic handler installed, a panic anywhere in matching, middleware
    /// or the handler is caught: it is logged, handed to the hook and answered
    /// with a bare 500. Without one the panic unwinds into the caller.
    pub fn serve(&self, request: Request) -> Response {
        let Some(hook) = &self.panic_handler else {
            return self.handle(request);
        };

        let method = request.method.clone();
        let path = request.path.clone();
        match catch_unwind(AssertUnwindSafe(|| self.handle(request))) {
            Ok(response) => response,
            Err(payload) => {
                error!(
                    method = %method,
                    path = %path,
                    panic_message = %panic_message(payload.as_ref()),
                    "Request handler panicked"
                );
                hook(payload.as_ref());
                let mut response = Response::new();
                response.set_status(500);
                response
            }
        }
    }

    fn handle(&self, request: Request) -> Response {
        let mut ctx = Context::new(request);

        let outcome = match self.route(&mut ctx) {
            Some(outcome) => outcome,
            None => match &self.follow {
                Some(follow) => {
                    debug!(
                        request_id = %ctx.request_id(),
                        method = %ctx.request.method,
                        path = %ctx.request.path,
                        "No route matched, following"
                    );
                    follow.serve(&mut ctx);
                    return ctx.response;
                }
                None => Err(Error::NotFound),
            },
        };

        self.finish(ctx, outcome)
    }

    /// Resolve and dispatch. `None` when no router matched the path.
    fn route(&self, ctx: &mut Context) -> Option<Result> {
        if self.config.use_cache {
            if let Some(entry) = self.cache.get(&ctx.request.path) {
                ctx.params = entry.params;
                ctx.matched = entry.chain;
                return Some(self.root.dispatch(ctx));
            }
        }

        let path = ctx.request.path.clone();
        if !self.root.matches(&path, ctx) {
            return None;
        }
        if self.config.use_cache {
            self.cache.set(
                path,
                CacheEntry {
                    chain: ctx.matched.clone(),
                    params: ctx.params.clone(),
                },
            );
        }
        Some(self.root.dispatch(ctx))
    }

    /// Translate the dispatch outcome into the final response.
    fn finish(&self, mut ctx: Context, outcome: Result) -> Response {
        let err = match outcome {
            Ok(()) => {
                debug!(
                    request_id = %ctx.request_id(),
                    client_ip = %ctx.client_ip().unwrap_or_default(),
                    method = %ctx.request.method,
                    target = %ctx.request.target(),
                    status = ctx.response.status(),
                    "Request served"
                );
                return ctx.response;
            }
            Err(err) => err,
        };

        let status = err.status();
        if status >= 500 {
            error!(
                request_id = %ctx.request_id(),
                client_ip = %ctx.client_ip().unwrap_or_default(),
                method = %ctx.request.method,
                target = %ctx.request.target(),
                status,
                error_id = err.id(),
                error = %err.message(),
                "Request failed"
            );
        } else {
            warn!(
                request_id = %ctx.request_id(),
                client_ip = %ctx.client_ip().unwrap_or_default(),
                method = %ctx.request.method,
                target = %ctx.request.target(),
                status,
                error_id = err.id(),
                error = %err.message(),
                "Request rejected"
            );
        }

        ctx.response.set_status(status);

        if status == 404 {
            if let Some(not_found) = &self.not_found {
                not_found(&mut ctx);
                return ctx.response;
            }
        }

        if self.config.render_error_bodies() {
            if let Some(body) = err.body() {
                ctx.render(&body);
            }
        }
        ctx.response
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("cached_routes", &self.cache.len())
            .field("follow", &self.follow.is_some())
            .field("not_found", &self.not_found.is_some())
            .field("panic_handler", &self.panic_handler.is_some())
            .finish()
    }
}

/// Best-effort text of a panic payload.
#[must_use]
pub fn panic_message(payload: &PanicPayload) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
