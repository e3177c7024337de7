//! Built-in middleware stages.
//!
//! Stages shipped with the crate; callers assemble them (and their own
//! [`crate::Middleware`] implementations) into a chain in whatever
//! order the application needs.
//!
//! - [`request_id`] - generate/propagate a per-request ID
//! - [`rate_limit`] - per-client request ceiling over a time window

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{Clock, RateLimitBuilder, RateLimitConfig, RateLimitMiddleware, SystemClock};
pub use request_id::RequestIdMiddleware;
