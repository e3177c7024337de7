//! # Talaria Middleware
//!
//! Middleware chain executor and built-in stages for the Talaria
//! request-dispatch core.
//!
//! A chain is an ordered list of stages wrapped around a terminal
//! function (normally the route dispatcher):
//!
//! ```text
//! Request → stage[0] → stage[1] → ... → terminal
//!                                           ↓
//! Response ← stage[0] ← stage[1] ← ... ←───┘
//! ```
//!
//! Each stage receives the request and a [`Next`] continuation. Code
//! before the `next.run()` call executes on the way in, code after it
//! executes on the way out with access to the inner response, and a
//! stage that returns without running `next` short-circuits everything
//! deeper in the chain. The continuation is consumed when run, so
//! invoking it twice is a compile error, not a runtime surprise.
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use http_body_util::Full;
//! use talaria_core::DispatchContext;
//! use talaria_middleware::stages::{RateLimitMiddleware, RequestIdMiddleware};
//! use talaria_middleware::MiddlewareChain;
//!
//! let chain = MiddlewareChain::new()
//!     .stage(RequestIdMiddleware::new())
//!     .stage(RateLimitMiddleware::builder().max_requests(100).build());
//!
//! assert_eq!(chain.stage_names(), vec!["request_id", "rate_limit"]);
//! ```
//!
//! Shared state (the rate limiter's window map) is owned by the stage
//! instance and internally synchronized; the chain itself is immutable
//! after construction and shared read-only across concurrent requests.

#![doc(html_root_url = "https://docs.rs/talaria-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod middleware;
pub mod stages;

pub use chain::{terminal_fn, MiddlewareChain};
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next, Terminal};
