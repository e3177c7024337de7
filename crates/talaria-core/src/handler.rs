//! Handler types.
//!
//! A [`Handler`] is the terminal target of dispatch: an async function
//! from a request plus its extracted path parameters to a response.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use talaria_router::PathParams;

use crate::types::{Request, Response};

/// A boxed future, as returned by handlers and middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The future a handler invocation resolves.
pub type HandlerFuture = BoxFuture<'static, Response>;

type HandlerFn = dyn Fn(Request, PathParams) -> HandlerFuture + Send + Sync;

/// A cloneable, type-erased route handler.
///
/// Handlers are stored in the route table and shared across concurrent
/// requests, so the wrapped function must be `Send + Sync`.
///
/// # Example
///
/// ```
/// use talaria_core::{Handler, Response};
/// use bytes::Bytes;
/// use http_body_util::Full;
///
/// let handler = Handler::new(|_request, params| async move {
///     let body = format!("user {}", params.get("id").unwrap_or("?"));
///     http::Response::builder()
///         .body(Full::new(Bytes::from(body)))
///         .unwrap()
/// });
/// ```
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Wraps an async function as a handler.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self(Arc::new(move |request, params| Box::pin(f(request, params))))
    }

    /// Invokes the handler.
    #[must_use]
    pub fn call(&self, request: Request, params: PathParams) -> HandlerFuture {
        (self.0)(request, params)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(<fn>)")
    }
}
