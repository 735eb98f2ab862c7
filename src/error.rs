//! # Error Module
//!
//! Error taxonomy for routing and dispatch.
//!
//! Every error that can leave [`Router::dispatch`](crate::router::Router::dispatch)
//! is classified into one of the variants of [`Error`]. The dispatcher turns the
//! classification into an HTTP status code, a stable internal identifier and an
//! optional body (see [`Dispatcher`](crate::dispatcher::Dispatcher)).
//!
//! | Variant | Status | Id |
//! |---|---|---|
//! | [`Error::Unexpected`] | 500 | 0 |
//! | [`Error::MethodNotImplemented`] | 405 | 1 |
//! | [`Error::NotFound`] | 404 | 2 |
//! | [`Error::NoMatch`] | 404 | 3 |
//! | [`Error::Http`] | caller defined | caller defined |

use std::fmt;

use thiserror::Error;

/// Identifier reported for errors whose origin could not be classified.
pub const UNEXPECTED_ERROR_ID: u32 = 0;
/// Identifier reported when a resource does not implement the requested verb.
pub const METHOD_NOT_IMPLEMENTED_ID: u32 = 1;
/// Identifier reported for plain 404 responses.
pub const NOT_FOUND_ID: u32 = 2;
/// Identifier reported when a group was dispatched without a matched child.
pub const NO_MATCH_ID: u32 = 3;

/// Result alias used by handlers and middleware.
pub type Result<T = ()> = std::result::Result<T, Error>;

/// Typed application error.
///
/// Handlers and middleware return this when they want full control over the
/// response: the status code and identifier are propagated verbatim, and the
/// body is rendered to the client when the dispatcher runs in debug mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    /// HTTP status code used for the response
    pub status: u16,
    /// Stable internal identifier for further reference
    pub id: u32,
    /// Human readable description, used for logging
    pub message: String,
    /// Content rendered to the client in debug mode
    pub body: Option<String>,
}

impl HttpError {
    pub fn new(status: u16, id: u32, message: impl Into<String>) -> Self {
        Self {
            status,
            id,
            message: message.into(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}, id {})", self.message, self.status, self.id)
    }
}

impl std::error::Error for HttpError {}

/// Errors produced while dispatching a request.
#[derive(Debug, Error)]
pub enum Error {
    /// A route group was dispatched but none of its children matched.
    #[error("No matching route found")]
    NoMatch,

    /// The matched resource does not implement the requested HTTP method.
    #[error("Method not implemented")]
    MethodNotImplemented,

    /// Plain 404, raised by the dispatcher when nothing matches.
    #[error("Not found")]
    NotFound,

    /// Typed application error carrying its own status and identifier.
    #[error("{0}")]
    Http(HttpError),

    /// Any other failure. Rendered as a generic 500.
    #[error("{0}")]
    Unexpected(anyhow::Error),
}

impl Error {
    /// Wrap an arbitrary error as [`Error::Unexpected`].
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Unexpected(anyhow::Error::new(err))
    }

    /// Build an [`Error::Unexpected`] from a plain message.
    pub fn msg(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Error::Unexpected(anyhow::Error::msg(message))
    }

    /// HTTP status code used when this error reaches the client.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Error::NoMatch | Error::NotFound => 404,
            Error::MethodNotImplemented => 405,
            Error::Http(e) => e.status,
            Error::Unexpected(_) => 500,
        }
    }

    /// Stable internal identifier.
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            Error::NoMatch => NO_MATCH_ID,
            Error::MethodNotImplemented => METHOD_NOT_IMPLEMENTED_ID,
            Error::NotFound => NOT_FOUND_ID,
            Error::Http(e) => e.id,
            Error::Unexpected(_) => UNEXPECTED_ERROR_ID,
        }
    }

    /// Description used for logging.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Error::Http(e) => e.message.clone(),
            other => other.to_string(),
        }
    }

    /// Body rendered to the client in debug mode.
    ///
    /// Unexpected errors expose the original message here; it must only ever
    /// be written out when debug mode is enabled.
    #[must_use]
    pub fn body(&self) -> Option<String> {
        match self {
            Error::Http(e) => e.body.clone(),
            Error::Unexpected(e) => Some(format!("{e:#}")),
            other => Some(other.to_string()),
        }
    }

    /// True for errors that do not carry a typed classification.
    #[must_use]
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Error::Unexpected(_))
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Error::Http(e)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Unexpected(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::other(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::other(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(Error::MethodNotImplemented.status(), 405);
        assert_eq!(Error::MethodNotImplemented.id(), METHOD_NOT_IMPLEMENTED_ID);
        assert_eq!(Error::NotFound.status(), 404);
        assert_eq!(Error::NoMatch.status(), 404);
        assert_eq!(Error::NoMatch.id(), NO_MATCH_ID);
        assert_eq!(Error::msg("boom").status(), 500);
        assert_eq!(Error::msg("boom").id(), UNEXPECTED_ERROR_ID);
    }

    #[test]
    fn test_http_error_is_verbatim() {
        let err: Error = HttpError::new(418, 120, "teapot").with_body("short and stout").into();
        assert_eq!(err.status(), 418);
        assert_eq!(err.id(), 120);
        assert_eq!(err.message(), "teapot");
        assert_eq!(err.body().as_deref(), Some("short and stout"));
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_foreign_errors_become_unexpected() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: Error = io.into();
        assert!(err.is_unexpected());
        assert_eq!(err.status(), 500);
        assert!(err.body().unwrap_or_default().contains("disk on fire"));
    }
}
