use std::sync::Arc;

use tracing::info;

use crate::config::DispatcherConfig;
use crate::context::Context;
use crate::middleware::Middleware;
use crate::resource::ResourceHandler;
use crate::route_cache::RouteCache;
use crate::router::{RouteGroup, Router};

use super::core::{Dispatcher, FollowHandler, NotFoundHook, PanicHook, PanicPayload};

/// Registration-time view of a [`Dispatcher`].
///
/// Routes, groups and global middleware are attached to an implicit root group
/// with an empty prefix, so top-level routers get the same onion semantics as
/// nested ones. [`DispatcherBuilder::build`] freezes the tree; there is no way
/// to register anything once the dispatcher exists.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use http::Method;
/// use restroute::{Context, Dispatcher, Request, ResourceHandler, Result, RouteGroup};
///
/// struct Pet;
/// impl ResourceHandler for Pet {
///     fn get(&self, ctx: &mut Context) -> Result {
///         let id = ctx.param("id").to_string();
///         ctx.render(&id);
///         Ok(())
///     }
/// }
///
/// let mut v1 = RouteGroup::new("/v1");
/// v1.add("/pets/:id", Arc::new(Pet));
///
/// let dispatcher = Dispatcher::builder().add_group(v1).build();
/// let res = dispatcher.serve(Request::new(Method::GET, "/v1/pets/3"));
/// assert_eq!(res.status(), 200);
/// assert_eq!(res.body_str(), "3");
/// ```
pub struct DispatcherBuilder {
    root: RouteGroup,
    config: DispatcherConfig,
    cache: Option<Arc<RouteCache>>,
    follow: Option<Arc<dyn FollowHandler>>,
    not_found: Option<NotFoundHook>,
    panic_handler: Option<PanicHook>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: RouteGroup::new(""),
            config: DispatcherConfig::default(),
            cache: None,
            follow: None,
            not_found: None,
            panic_handler: None,
        }
    }

    /// Replace the whole configuration. Later setters override single fields.
    #[must_use]
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.config.use_cache = enabled;
        self
    }

    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    #[must_use]
    pub fn silent(mut self, enabled: bool) -> Self {
        self.config.silent = enabled;
        self
    }

    /// Use an existing cache instead of a private one, e.g. to inspect it from tests.
    #[must_use]
    pub fn cache(mut self, cache: Arc<RouteCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Forward unmatched requests to `handler` instead of answering 404.
    ///
    /// Only requests that match no route are forwarded; a 404 returned by a
    /// matched handler is not.
    #[must_use]
    pub fn follow(mut self, handler: impl FollowHandler + 'static) -> Self {
        self.follow = Some(Arc::new(handler));
        self
    }

    /// Custom responder for every error classified as 404.
    #[must_use]
    pub fn not_found<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(hook));
        self
    }

    /// Catch panics raised while serving and report them to `hook`.
    #[must_use]
    pub fn panic_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&PanicPayload) + Send + Sync + 'static,
    {
        self.panic_handler = Some(Arc::new(hook));
        self
    }

    /// Register a top-level route.
    #[must_use]
    pub fn add(mut self, path: &str, handler: Arc<dyn ResourceHandler>) -> Self {
        self.root.add(path, handler);
        self
    }

    /// Register a top-level group.
    #[must_use]
    pub fn add_group(mut self, group: RouteGroup) -> Self {
        self.root.add_group(group);
        self
    }

    /// Register global middleware, run around every matched request.
    #[must_use]
    pub fn insert(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.root.insert(middleware);
        self
    }

    /// Freeze the routing tree.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        info!(
            routers = self.root.children().len(),
            use_cache = self.config.use_cache,
            debug = self.config.debug,
            silent = self.config.silent,
            follow = self.follow.is_some(),
            "Dispatcher built"
        );
        Dispatcher {
            root: Router::from(self.root),
            config: self.config,
            cache: self.cache.unwrap_or_default(),
            follow: self.follow,
            not_found: self.not_found,
            panic_handler: self.panic_handler,
        }
    }
}
