#![allow(dead_code)]

use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;
use restroute::{Context, Error, HttpError, Middleware, Request, ResourceHandler, Result};

/// Ordered log of hook invocations shared by a test's middleware and handlers.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// Where a [`Recorder`] should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Never,
    Pre,
    Post,
    End,
}

/// Middleware that records `<name>.pre`, `<name>.post` and `<name>.end`.
pub struct Recorder {
    name: &'static str,
    trace: Trace,
    fail: FailAt,
}

impl Recorder {
    pub fn new(name: &'static str, trace: &Trace) -> Arc<Self> {
        Self::failing(name, trace, FailAt::Never)
    }

    pub fn failing(name: &'static str, trace: &Trace, fail: FailAt) -> Arc<Self> {
        Arc::new(Self {
            name,
            trace: trace.clone(),
            fail,
        })
    }

    fn hook(&self, stage: &str, fail: FailAt) -> Result {
        self.trace.push(format!("{}.{}", self.name, stage));
        if self.fail == fail {
            return Err(HttpError::new(403, 100, format!("{} rejected at {stage}", self.name)).into());
        }
        Ok(())
    }
}

impl Middleware for Recorder {
    fn pre_dispatch(&self, _ctx: &mut Context) -> Result {
        self.hook("pre", FailAt::Pre)
    }

    fn post_dispatch(&self, _ctx: &mut Context) -> Result {
        self.hook("post", FailAt::Post)
    }

    fn end(&self, _ctx: &mut Context) -> Result {
        self.hook("end", FailAt::End)
    }
}

/// Handler that records `<name>` and renders it, for GET and POST.
pub struct Named {
    name: &'static str,
    trace: Trace,
}

impl Named {
    pub fn new(name: &'static str, trace: &Trace) -> Arc<Self> {
        Arc::new(Self {
            name,
            trace: trace.clone(),
        })
    }
}

impl ResourceHandler for Named {
    fn get(&self, ctx: &mut Context) -> Result {
        self.trace.push(self.name);
        ctx.render(self.name);
        Ok(())
    }

    fn post(&self, ctx: &mut Context) -> Result {
        self.trace.push(format!("{}.post", self.name));
        ctx.render(self.name);
        Ok(())
    }
}

/// Handler that renders every captured parameter as `k=v;`.
pub struct EchoParams;

impl ResourceHandler for EchoParams {
    fn get(&self, ctx: &mut Context) -> Result {
        let out: String = ctx.params.iter().map(|(k, v)| format!("{k}={v};")).collect();
        ctx.render(&out);
        Ok(())
    }
}

/// Handler whose GET fails with a caller-chosen error.
pub struct Failing(pub fn() -> Error);

impl ResourceHandler for Failing {
    fn get(&self, ctx: &mut Context) -> Result {
        ctx.render("partial;");
        Err((self.0)())
    }
}

/// Handler whose GET panics.
pub struct Panicking;

impl ResourceHandler for Panicking {
    fn get(&self, _ctx: &mut Context) -> Result {
        panic!("handler exploded");
    }
}

pub fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

/// Scoped subscriber writing through the test harness' captured output.
pub fn test_tracing() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::set_default(subscriber)
}
