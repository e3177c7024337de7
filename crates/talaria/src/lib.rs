//! # Talaria
//!
//! **HTTP request-dispatch core.**
//!
//! Talaria is the piece between a host server loop and application
//! handlers: given an already-parsed request and a registered route
//! tree, it selects the matching route, extracts path parameters,
//! executes an ordered middleware chain around the handler, and
//! produces a response.
//!
//! - **Ordered matching** - routes and nested scopes flatten into one
//!   table; a linear scan with first-match-wins semantics keeps
//!   precedence fully under the caller's control
//! - **Onion middleware** - short-circuit, pass-through, and
//!   response transformation with a consume-once continuation
//! - **Stateful stages** - a built-in per-client rate limiter with an
//!   internally synchronized window map
//!
//! Transport concerns (accepting connections, TLS, deadlines,
//! converting panics into 500s) belong to the host.
//!
//! ## Quick start
//!
//! ```
//! use http::{Method, StatusCode};
//! use talaria::routes::{get, scope};
//! use talaria::{build_dispatcher, compose_middleware};
//! use talaria_core::{Response, ResponseExt};
//! use talaria_middleware::stages::RequestIdMiddleware;
//! use talaria_middleware::MiddlewareChain;
//!
//! # tokio_test::block_on(async {
//! let dispatcher = build_dispatcher(vec![scope("/api", vec![
//!     get("/users/:id", |_request, params| {
//!         let id = params.get("id").unwrap_or("?").to_string();
//!         async move { Response::error(StatusCode::OK, &id) }
//!     }),
//! ])]);
//!
//! let pipeline = compose_middleware(
//!     MiddlewareChain::new().stage(RequestIdMiddleware::new()),
//!     dispatcher,
//! );
//!
//! let request = http::Request::builder()
//!     .method(Method::GET)
//!     .uri("/api/users/7")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//!
//! let response = pipeline.call(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/talaria/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatch;
pub mod routes;

// Re-export component crates
pub use talaria_core as core;
pub use talaria_middleware as middleware;
pub use talaria_router as router;

pub use dispatch::{build_dispatcher, compose_middleware, Dispatcher, RequestPipeline};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use talaria::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dispatch::{build_dispatcher, compose_middleware, Dispatcher, RequestPipeline};
    pub use crate::routes::{any, delete, get, patch, post, put, scope};

    pub use talaria_core::{
        DispatchContext, DispatchResult, Error, Handler, Request, RequestId, Response, ResponseExt,
    };

    pub use talaria_middleware::stages::{RateLimitMiddleware, RequestIdMiddleware};
    pub use talaria_middleware::{FnMiddleware, Middleware, MiddlewareChain, Next};

    pub use talaria_router::{
        extract_params, raw_param_names, MethodFilter, PathParams, Route, RouteEntry, RouteTable,
    };
}
