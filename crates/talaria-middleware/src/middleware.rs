//! Core middleware trait and the chain continuation.
//!
//! This module defines the [`Middleware`] trait and [`Next`], the
//! continuation a middleware invokes to hand the request to the rest of
//! the chain.
//!
//! # Contract
//!
//! A middleware may:
//!
//! - return a response directly without touching `next`, short-circuiting
//!   everything deeper in the chain;
//! - call `next.run()` and return (or transform) the inner response;
//! - run code on both sides of the `next.run()` call (onion layering).
//!
//! Calling `next` more than once is unrepresentable: [`Next::run`]
//! consumes the continuation.
//!
//! # Example
//!
//! ```
//! use talaria_core::{BoxFuture, DispatchContext, Request, Response};
//! use talaria_middleware::{Middleware, Next};
//!
//! struct ServerHeader;
//!
//! impl Middleware for ServerHeader {
//!     fn name(&self) -> &'static str {
//!         "server_header"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         ctx: &'a mut DispatchContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let mut response = next.run(ctx, request).await;
//!             response
//!                 .headers_mut()
//!                 .insert("server", "talaria".parse().unwrap());
//!             response
//!         })
//!     }
//! }
//! ```

use std::sync::Arc;

use talaria_core::{BoxFuture, DispatchContext, Request, Response};

/// A type-erased middleware stage that can be stored in a chain.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The terminal function a chain bottoms out in, typically the route
/// dispatcher. Borrows the context only synchronously; the returned
/// future owns everything it needs.
pub type Terminal<'a> =
    Box<dyn FnOnce(&mut DispatchContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

/// The core middleware trait.
///
/// Middleware receives a mutable per-request context, the incoming
/// request, and a [`Next`] continuation for the remainder of the chain.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    ///
    /// Used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Processes the request through this middleware.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut DispatchContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Continuation over the remainder of a middleware chain.
///
/// `Next` is an index cursor over the chain's stage list plus the
/// terminal function: running it evaluates the stage at the cursor with
/// a continuation advanced by one, and evaluates the terminal once the
/// cursor passes the end. It is consumed by [`Next::run`], so a stage
/// physically cannot invoke the rest of the chain twice.
pub struct Next<'a> {
    /// The chain's stages, shared read-only.
    chain: &'a [BoxedMiddleware],

    /// Index of the stage this continuation resumes at.
    index: usize,

    /// Invoked when the cursor passes the last stage.
    terminal: Terminal<'a>,
}

impl<'a> Next<'a> {
    /// Creates a continuation starting at the head of the chain.
    pub(crate) fn new(chain: &'a [BoxedMiddleware], terminal: Terminal<'a>) -> Self {
        Self {
            chain,
            index: 0,
            terminal,
        }
    }

    /// Invokes the next middleware, or the terminal function if the
    /// chain is exhausted.
    ///
    /// Consumes `self`: each continuation can run at most once.
    pub async fn run(self, ctx: &mut DispatchContext, request: Request) -> Response {
        let Self {
            chain,
            index,
            terminal,
        } = self;

        match chain.get(index) {
            Some(middleware) => {
                let next = Next {
                    chain,
                    index: index + 1,
                    terminal,
                };
                middleware.handle(ctx, request, next).await
            }
            None => terminal(ctx, request).await,
        }
    }
}

/// A middleware built from a named function.
///
/// Lets callers define one-off stages without a dedicated type.
///
/// # Example
///
/// ```
/// use talaria_middleware::FnMiddleware;
///
/// let timing = FnMiddleware::new("timing", |ctx, request, next| {
///     Box::pin(async move {
///         let response = next.run(ctx, request).await;
///         tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
///         response
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut DispatchContext, Request, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut DispatchContext, Request, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut DispatchContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        (self.func)(ctx, request, next)
    }
}
