//! Route dispatch.
//!
//! The [`Dispatcher`] is the terminal of the middleware chain: it
//! resolves the request path against the route table, records the match
//! on the [`DispatchContext`], and invokes the route handler. The
//! [`RequestPipeline`] wraps a dispatcher in a middleware chain and is
//! the one object the host server loop calls per request.

use std::sync::Arc;

use talaria_core::{DispatchContext, Error, Handler, HandlerFuture, Request, Response};
use talaria_middleware::{terminal_fn, MiddlewareChain};
use talaria_router::{PathParams, RouteEntry, RouteTable};

/// Resolves requests against a route table and invokes handlers.
///
/// The table is built once and shared read-only; requests that match no
/// route go to the fallback handler (a 404 JSON error unless replaced
/// via [`Dispatcher::with_fallback`], e.g. for static-asset lookup).
///
/// # Example
///
/// ```
/// use talaria::routes::{get, scope};
/// use talaria::Dispatcher;
/// use talaria_core::{Response, ResponseExt};
/// use http::StatusCode;
///
/// let dispatcher = Dispatcher::new(vec![
///     get("/health", |_req, _params| async {
///         Response::error(StatusCode::OK, "ok")
///     }),
///     scope("/api", vec![
///         get("/users/:id", |_req, params| {
///             let id = params.get("id").unwrap_or("?").to_string();
///             async move { Response::error(StatusCode::OK, &id) }
///         }),
///     ]),
/// ]);
///
/// assert_eq!(dispatcher.table().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable<Handler>>,
    fallback: Handler,
}

impl Dispatcher {
    /// Flattens the route tree and builds the dispatcher with the
    /// default 404 fallback.
    #[must_use]
    pub fn new(entries: Vec<RouteEntry<Handler>>) -> Self {
        Self {
            table: Arc::new(RouteTable::new(entries)),
            fallback: Handler::new(|_request, _params| async {
                Error::not_found("no route matched the request").into_response()
            }),
        }
    }

    /// Replaces the no-match fallback handler.
    ///
    /// The fallback decides what an unmatched request becomes: a plain
    /// 404, a static-file lookup, a reverse-proxy hop.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Handler) -> Self {
        self.fallback = fallback;
        self
    }

    /// Returns the underlying route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable<Handler> {
        &self.table
    }

    /// Resolves and invokes the handler for a request.
    ///
    /// Matching happens synchronously; the returned future is the
    /// handler's own. On a match the route pattern and extracted
    /// parameters are recorded on the context before the handler runs,
    /// so outer middleware and response collaborators can read them on
    /// the way out.
    pub fn dispatch(&self, ctx: &mut DispatchContext, request: Request) -> HandlerFuture {
        let path = request.uri().path().to_string();

        match self.table.resolve(request.method(), &path) {
            Some(found) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    method = %request.method(),
                    pattern = found.route.pattern(),
                    "route matched"
                );
                ctx.set_matched_route(found.route.pattern(), found.params.clone());
                found.route.handler().call(request, found.params)
            }
            None => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    method = %request.method(),
                    path = %path,
                    "no route matched"
                );
                self.fallback.call(request, PathParams::new())
            }
        }
    }
}

/// Builds a dispatcher from a route tree.
///
/// Convenience for [`Dispatcher::new`]; this is the startup entry point
/// for hosts that don't need a custom fallback.
#[must_use]
pub fn build_dispatcher(entries: Vec<RouteEntry<Handler>>) -> Dispatcher {
    Dispatcher::new(entries)
}

/// A middleware chain composed around a dispatcher.
///
/// This is the composed per-request handler handed to the host server
/// loop: it creates the per-request context, runs the chain with the
/// dispatcher as terminal, and always resolves to a concrete
/// [`Response`]. If a handler panics, the panic propagates; the host
/// converts it to a generic 500 at its own boundary.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    chain: MiddlewareChain,
    dispatcher: Arc<Dispatcher>,
}

impl RequestPipeline {
    /// Composes a chain around a dispatcher.
    #[must_use]
    pub fn new(chain: MiddlewareChain, dispatcher: Dispatcher) -> Self {
        Self {
            chain,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Handles one request with a fresh [`DispatchContext`].
    pub async fn call(&self, request: Request) -> Response {
        let mut ctx = DispatchContext::new();
        self.call_with_context(&mut ctx, request).await
    }

    /// Handles one request with a caller-provided context.
    ///
    /// Lets the host observe the context after the response resolves
    /// (matched pattern, path parameters, elapsed time).
    pub async fn call_with_context(
        &self,
        ctx: &mut DispatchContext,
        request: Request,
    ) -> Response {
        let dispatcher = Arc::clone(&self.dispatcher);
        self.chain
            .execute(
                ctx,
                request,
                terminal_fn(move |ctx, request| dispatcher.dispatch(ctx, request)),
            )
            .await
    }
}

/// Composes a middleware chain and a dispatcher into a request pipeline.
///
/// Convenience for [`RequestPipeline::new`], mirroring
/// [`build_dispatcher`].
#[must_use]
pub fn compose_middleware(chain: MiddlewareChain, dispatcher: Dispatcher) -> RequestPipeline {
    RequestPipeline::new(chain, dispatcher)
}
