//! Resource handlers: the endpoint side of a route.
//!
//! A resource implements one method per HTTP verb. Every method has a default
//! that fails with [`Error::MethodNotImplemented`] (405), so a resource only
//! overrides the verbs it actually serves.
//!
//! ```rust
//! use restroute::{Context, ResourceHandler, Result};
//!
//! struct Hello;
//!
//! impl ResourceHandler for Hello {
//!     fn get(&self, ctx: &mut Context) -> Result {
//!         let name = ctx.param("name").to_string();
//!         ctx.render(&format!("Hello, {name}!"));
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Handlers are shared by every request that hits their route, possibly from
//! many threads at once, so they take `&self` and must be `Send + Sync`.
//! One handler may be registered under several paths (e.g. to emulate optional
//! parameters) by cloning the `Arc` it is registered with.

use crate::context::Context;
use crate::error::{Error, Result};

pub trait ResourceHandler: Send + Sync {
    fn get(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn post(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn put(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn patch(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn delete(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn options(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn head(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn trace(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }

    fn connect(&self, _ctx: &mut Context) -> Result {
        Err(Error::MethodNotImplemented)
    }
}
