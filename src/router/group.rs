use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, error, warn};

use super::core::{RouteMatch, Router, MAX_INLINE_DEPTH};
use super::route::Route;
use super::segment::Pattern;
use crate::context::{Context, Params};
use crate::dispatcher::panic_message;
use crate::error::{Error, Result};
use crate::middleware::Middleware;
use crate::resource::ResourceHandler;

/// Routes and nested groups sharing a URL prefix and a middleware chain.
///
/// Children are matched in registration order and the first match wins.
/// A group is built by value and frozen once it is added to a parent (or to
/// the dispatcher), so the routing tree is read-only while serving.
///
/// ```rust
/// use std::sync::Arc;
/// use restroute::{Context, ResourceHandler, Result, RouteGroup};
///
/// struct User;
/// impl ResourceHandler for User {
///     fn get(&self, ctx: &mut Context) -> Result {
///         let id = ctx.param("id").to_string();
///         ctx.render(&id);
///         Ok(())
///     }
/// }
///
/// let mut users = RouteGroup::new("/users");
/// users.add("/:id", Arc::new(User));
///
/// let mut v1 = RouteGroup::new("/v1");
/// v1.add_group(users);
/// ```
pub struct RouteGroup {
    prefix: String,
    pattern: Pattern,
    children: Vec<Router>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl RouteGroup {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            pattern: Pattern::parse_prefix(prefix),
            children: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// The group prefix as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    #[must_use]
    pub fn children(&self) -> &[Router] {
        &self.children
    }

    /// Bind `path` (relative to this group) to `handler`.
    pub fn add(&mut self, path: &str, handler: Arc<dyn ResourceHandler>) {
        let route = Route::with_prefix(&self.prefix, path, handler);
        debug!(group = %self.prefix, route = %route.path(), "Route registered");
        self.children.push(Router::Route(Arc::new(route)));
    }

    /// Nest `group` under this one. Its prefix is relative to ours.
    pub fn add_group(&mut self, group: RouteGroup) {
        debug!(group = %self.prefix, child = %group.prefix, "Group registered");
        self.children.push(Router::Group(Arc::new(group)));
    }

    /// Append middleware to this group's chain. Hooks run in insertion order.
    pub fn insert(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Strip the prefix and try every child in order against the remainder.
    ///
    /// Prefix parameters are applied before the child's, so a name declared at
    /// both levels resolves to the innermost capture.
    pub(crate) fn resolve(&self, segments: &[&str]) -> Option<(Params, RouteMatch)> {
        if !self.pattern.prefix_matches(segments) {
            return None;
        }
        let rest = &segments[self.pattern.len()..];

        self.children.iter().find_map(|child| {
            let found = child.resolve(rest)?;
            let mut params = Params::new();
            self.pattern.capture(segments, &mut params);
            Some((params, found))
        })
    }

    /// Onion dispatch for one nesting level.
    ///
    /// `rest` is the remainder of the match chain below this group; its first
    /// element is the child that matched. Entering registers the group with
    /// `unwind`, which runs its `end` hooks once the outermost dispatch is over,
    /// whatever path leaves this function.
    pub(crate) fn dispatch_chain<'g>(
        &'g self,
        rest: &'g [Router],
        unwind: &mut Unwind<'g, '_>,
    ) -> Result {
        unwind.entered.push(self);

        let Some((child, below)) = rest.split_first() else {
            debug!(group = %self.prefix, "Group dispatched without a matched child");
            return Err(Error::NoMatch);
        };

        for mw in &self.middleware {
            mw.pre_dispatch(unwind.ctx)?;
        }

        child.dispatch_chain(below, unwind)?;

        for mw in &self.middleware {
            mw.post_dispatch(unwind.ctx)?;
        }

        Ok(())
    }

    /// Runs every `end` hook of this group.
    ///
    /// While a handler panic is unwinding, a panicking hook is caught and
    /// logged so it cannot abort the process.
    fn end_dispatch(&self, ctx: &mut Context) {
        let unwinding = std::thread::panicking();
        for mw in &self.middleware {
            let outcome = if unwinding {
                match panic::catch_unwind(AssertUnwindSafe(|| mw.end(ctx))) {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        error!(
                            request_id = %ctx.request_id(),
                            group = %self.prefix,
                            panic = %panic_message(&*payload),
                            "End hook panicked during unwinding"
                        );
                        continue;
                    }
                }
            } else {
                mw.end(ctx)
            };
            if let Err(e) = outcome {
                warn!(
                    request_id = %ctx.request_id(),
                    group = %self.prefix,
                    error = %e,
                    "End hook failed"
                );
            }
        }
    }
}

impl fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("prefix", &self.prefix)
            .field("children", &self.children)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

/// Finalizer of one dispatch: runs the `end` hooks of every entered group,
/// innermost first, when dropped.
///
/// Dropping happens after the outermost group's `post_dispatch` hooks, so for
/// `G1 { G2 { R } }` the order is `G2.post, G1.post, G2.end, G1.end`. It also
/// happens while unwinding from a panic.
pub(crate) struct Unwind<'g, 'c> {
    pub(crate) ctx: &'c mut Context,
    entered: SmallVec<[&'g RouteGroup; MAX_INLINE_DEPTH]>,
}

impl<'g, 'c> Unwind<'g, 'c> {
    pub(crate) fn new(ctx: &'c mut Context) -> Self {
        Self {
            ctx,
            entered: SmallVec::new(),
        }
    }
}

impl Drop for Unwind<'_, '_> {
    fn drop(&mut self) {
        for group in self.entered.iter().rev() {
            group.end_dispatch(self.ctx);
        }
    }
}
