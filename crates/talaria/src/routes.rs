//! Route registration helpers.
//!
//! Thin constructors over [`RouteEntry`] that wrap plain async
//! functions into [`Handler`]s, so route trees read declaratively:
//!
//! ```
//! use talaria::routes::{delete, get, post, scope};
//! use talaria_core::{Response, ResponseExt};
//! use http::StatusCode;
//!
//! let tree = vec![
//!     get("/health", |_req, _params| async {
//!         Response::error(StatusCode::OK, "ok")
//!     }),
//!     scope("/api/v1", vec![
//!         post("/users", |_req, _params| async {
//!             Response::error(StatusCode::CREATED, "created")
//!         }),
//!         delete("/users/:id", |_req, _params| async {
//!             Response::error(StatusCode::NO_CONTENT, "")
//!         }),
//!     ]),
//! ];
//! assert_eq!(tree.len(), 2);
//! ```

use std::future::Future;

use http::Method;
use talaria_core::{Handler, Request, Response};
use talaria_router::{MethodFilter, PathParams, Route, RouteEntry};

fn route<F, Fut>(method: MethodFilter, pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    RouteEntry::Route(Route::new(method, pattern, Handler::new(f)))
}

/// Registers a GET route.
pub fn get<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Only(Method::GET), pattern, f)
}

/// Registers a POST route.
pub fn post<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Only(Method::POST), pattern, f)
}

/// Registers a PUT route.
pub fn put<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Only(Method::PUT), pattern, f)
}

/// Registers a PATCH route.
pub fn patch<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Only(Method::PATCH), pattern, f)
}

/// Registers a DELETE route.
pub fn delete<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Only(Method::DELETE), pattern, f)
}

/// Registers a route matching every HTTP method.
pub fn any<F, Fut>(pattern: &str, f: F) -> RouteEntry<Handler>
where
    F: Fn(Request, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    route(MethodFilter::Any, pattern, f)
}

/// Groups entries under a shared path prefix.
///
/// Prefixes concatenate by plain string concatenation; the caller owns
/// the slashes.
pub fn scope(prefix: &str, entries: Vec<RouteEntry<Handler>>) -> RouteEntry<Handler> {
    RouteEntry::scope(prefix, entries)
}
