//! # Talaria Core
//!
//! Core types for the Talaria request-dispatch core.
//!
//! This crate provides the foundational types used throughout Talaria:
//!
//! - [`Request`] / [`Response`] - the HTTP types the core operates on
//! - [`Handler`] - type-erased async route handler
//! - [`DispatchContext`] - per-request context carrying the request ID,
//!   matched route, and typed extensions
//! - [`RequestId`] - UUID v7 request identifier
//! - [`Error`] - standard error type with status-code mapping

#![doc(html_root_url = "https://docs.rs/talaria-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;
mod types;

pub use context::{DispatchContext, RequestId};
pub use error::{DispatchResult, Error, ErrorCategory};
pub use handler::{BoxFuture, Handler, HandlerFuture};
pub use types::{Request, Response, ResponseExt};
