//! # Context Module
//!
//! Per-request state shared along the whole dispatch of one request.
//!
//! A [`Context`] is created fresh by the dispatcher for every inbound request and
//! dropped when the response has been produced. It is never shared across
//! requests, so nothing in it is synchronized.
//!
//! ## Contents
//!
//! - [`Request`] - the normalized `(method, path, headers)` view of the inbound request
//! - [`Response`] - the response sink handlers and middleware write into
//! - [`Params`] - parameters captured from the matched route pattern
//! - the match chain recorded by [`Router::matches`](crate::router::Router::matches)
//! - `data` - free typed storage (`http::Extensions`) for middleware and handlers
//!
//! ## JSF Compliance
//!
//! Params and headers use `SmallVec` so the common case (≤8 params, ≤16 headers)
//! stays off the heap. Names are `Arc<str>` because they come from the static
//! route tree and are cloned into every request that matches.

use std::borrow::Cow;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use http::Method;
use serde::Serialize;
use smallvec::SmallVec;

use crate::error::Result;
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::{MatchChain, Router};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage. Lookups are case-insensitive.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Headers consulted by [`Context::client_ip`], in priority order.
const CLIENT_IP_HEADERS: [&str; 6] = [
    "x-real-ip",
    "real-ip",
    "x-forwarded-for",
    "x-forwarded",
    "forwarded-for",
    "forwarded",
];

/// Route parameters captured during matching.
///
/// Keys are unique: setting an existing name replaces its value, so when a
/// nested group and its route both declare `:id` the innermost capture wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `name`, if captured.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<Arc<str>>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Remove `name`, returning its value.
    pub fn del(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k.as_ref() == name)?;
        Some(self.0.remove(pos).1)
    }

    /// Apply every entry of `other` on top of `self` (last write wins).
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in other.iter() {
            self.set(Arc::clone(k), v.clone());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &String)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// Owned copy as a `HashMap`. Allocates; prefer [`Params::get`] on the hot path.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn replace_header(headers: &mut HeaderVec, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value));
}

/// Transport-neutral view of an inbound request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method as received
    pub method: Method,
    /// Raw request path, query string excluded. Used verbatim as the cache key.
    pub path: String,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    /// Request headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Peer address as reported by the transport
    pub remote_addr: Option<String>,
}

impl Request {
    /// Build a request from a method and a request target (`/path?query`).
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (uri, None),
        };
        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderVec::new(),
            remote_addr: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = Some(addr.into());
        self
    }

    /// Header value by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Convert an `http` crate request. The body is left to the host.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let mut headers = HeaderVec::new();
        for (name, value) in req.headers() {
            if let Ok(v) = value.to_str() {
                headers.push((Arc::from(name.as_str()), v.to_string()));
            }
        }
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            headers,
            remote_addr: None,
        }
    }

    /// Path plus query string, as originally requested.
    #[must_use]
    pub fn target(&self) -> Cow<'_, str> {
        match &self.query {
            Some(q) => Cow::Owned(format!("{}?{}", self.path, q)),
            None => Cow::Borrowed(self.path.as_str()),
        }
    }
}

/// Response sink written by handlers and middleware.
///
/// Middleware may replace or wrap the body freely between `PreDispatch` and
/// `End`; the dispatcher hands whatever is left to the transport.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: Option<u16>,
    headers: HeaderVec,
    body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status code, `200` if nobody set one.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// True once a status code has been written explicitly.
    #[must_use]
    pub fn has_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn set_status(&mut self, code: u16) {
        self.status = Some(code);
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Add or replace a header.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        replace_header(&mut self.headers, name, value.into());
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &self.headers
    }

    /// Append to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, lossily decoded.
    #[must_use]
    pub fn body_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Convert into an `http` crate response for the host transport.
    pub fn into_http(self) -> std::result::Result<http::Response<Vec<u8>>, http::Error> {
        let mut builder = http::Response::builder().status(self.status());
        for (name, value) in &self.headers {
            builder = builder.header(&**name, value.as_str());
        }
        builder.body(self.body)
    }
}

/// Data and status storage for one in-flight request.
pub struct Context {
    /// The inbound request
    pub request: Request,
    /// The response being built
    pub response: Response,
    /// Parameters captured from the matched pattern
    pub params: Params,
    /// Free typed storage for handlers and middleware
    pub data: http::Extensions,
    request_id: RequestId,
    pub(crate) matched: MatchChain,
}

impl Context {
    /// Fresh context for `request`. Honors an upstream `x-request-id` ULID.
    pub fn new(request: Request) -> Self {
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        Self {
            request,
            response: Response::new(),
            params: Params::new(),
            data: http::Extensions::new(),
            request_id,
            matched: MatchChain::new(),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Routers recorded by the last successful match, outermost first.
    #[must_use]
    pub fn matched(&self) -> &[Router] {
        &self.matched
    }

    /// The terminal router of the match chain.
    #[must_use]
    pub fn route(&self) -> Option<&Router> {
        self.matched.last()
    }

    /// Captured route parameter, or `""` when absent.
    #[must_use]
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).unwrap_or("")
    }

    /// First value of a query string parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<String> {
        let query = self.request.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    /// Client address, preferring common proxy headers over the peer address.
    #[must_use]
    pub fn client_ip(&self) -> Option<String> {
        let raw = CLIENT_IP_HEADERS
            .iter()
            .filter_map(|h| self.request.header(h))
            .find(|v| !v.trim().is_empty())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .or(self.request.remote_addr.as_deref())?;

        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Some(addr.ip().to_string());
        }
        if let Ok(ip) = raw.parse::<IpAddr>() {
            return Some(ip.to_string());
        }
        raw.split(':').next().map(str::to_string)
    }

    /// Set the response status code.
    pub fn status(&mut self, code: u16) {
        self.response.set_status(code);
    }

    /// Write text to the response body.
    pub fn render(&mut self, content: &str) {
        self.response.write(content.as_bytes());
    }

    /// Serialize `data` as JSON into the response body.
    pub fn render_json<T: Serialize + ?Sized>(&mut self, data: &T) -> Result {
        let encoded = serde_json::to_vec(data)?;
        self.response.set_header("content-type", "application/json");
        self.response.write(&encoded);
        Ok(())
    }

    /// Redirect the client to `location` with `code` (301, 302, 307, ...).
    pub fn redirect(&mut self, location: &str, code: u16) {
        self.response.set_header("location", location);
        self.response.set_status(code);
    }
}
