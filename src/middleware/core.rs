use crate::context::Context;
use crate::error::Result;

/// Filter that runs around every dispatch of the group it is inserted into.
///
/// - `pre_dispatch` runs before the matched child, outermost group first.
///   Returning an error stops the chain at this level.
/// - `post_dispatch` runs after a successful child dispatch, innermost group first.
/// - `end` always runs, exactly once per traversed group, even when a
///   pre/post hook or the handler failed. Errors from `end` are logged, never
///   propagated.
///
/// Middleware is shared by all concurrent requests and should keep per-request
/// state in [`Context::data`], not in `self`.
pub trait Middleware: Send + Sync {
    fn pre_dispatch(&self, _ctx: &mut Context) -> Result {
        Ok(())
    }

    fn post_dispatch(&self, _ctx: &mut Context) -> Result {
        Ok(())
    }

    fn end(&self, _ctx: &mut Context) -> Result {
        Ok(())
    }
}
