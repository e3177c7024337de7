//! Ordered middleware chain execution.
//!
//! A [`MiddlewareChain`] composes an ordered list of middleware stages
//! with a terminal function into a single request handler. Execution
//! walks the stage list by index from 0; each stage receives a [`Next`]
//! continuation that resumes at the following index, reaching the
//! terminal once the index passes the end of the list.
//!
//! The executor adds no error handling of its own: stage and handler
//! panics propagate to the host boundary untouched, and every successful
//! path produces a concrete [`Response`] value.

use std::sync::Arc;

use talaria_core::{BoxFuture, DispatchContext, Request, Response};

use crate::middleware::{BoxedMiddleware, Middleware, Next, Terminal};

/// An ordered, immutable-after-construction middleware chain.
///
/// The chain itself holds no per-request state; it is shared read-only
/// across concurrent requests. Stages that need cross-request state own
/// it internally (see the rate-limit stage).
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use http_body_util::Full;
/// use talaria_core::DispatchContext;
/// use talaria_middleware::{FnMiddleware, MiddlewareChain};
///
/// # tokio_test::block_on(async {
/// let chain = MiddlewareChain::new().stage(FnMiddleware::new("tag", |ctx, req, next| {
///     Box::pin(async move {
///         let mut response = next.run(ctx, req).await;
///         response.headers_mut().insert("x-tag", "seen".parse().unwrap());
///         response
///     })
/// }));
///
/// let mut ctx = DispatchContext::new();
/// let request = http::Request::builder()
///     .uri("/")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let response = chain
///     .execute(&mut ctx, request, Box::new(|_ctx, _req| {
///         Box::pin(async {
///             http::Response::builder().body(Full::new(Bytes::new())).unwrap()
///         })
///     }))
///     .await;
///
/// assert_eq!(response.headers().get("x-tag").unwrap(), "seen");
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<BoxedMiddleware>,
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Creates a chain from pre-boxed stages, preserving their order.
    #[must_use]
    pub fn from_stages(stages: Vec<BoxedMiddleware>) -> Self {
        Self { stages }
    }

    /// Appends a stage to the end of the chain.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends a pre-boxed stage to the end of the chain.
    pub fn push(&mut self, middleware: BoxedMiddleware) {
        self.stages.push(middleware);
    }

    /// Runs the request through every stage in order, bottoming out in
    /// `terminal`.
    ///
    /// A stage that returns without invoking its continuation
    /// short-circuits: later stages and the terminal never run.
    pub async fn execute(
        &self,
        ctx: &mut DispatchContext,
        request: Request,
        terminal: Terminal<'_>,
    ) -> Response {
        Next::new(&self.stages, terminal).run(ctx, request).await
    }

    /// Returns the names of the stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Boxes an async terminal function for [`MiddlewareChain::execute`].
///
/// The closure borrows the context only synchronously and returns an
/// owned future, which is what lets the dispatcher record the matched
/// route on the context before the handler future is polled.
pub fn terminal_fn<'a, F>(f: F) -> Terminal<'a>
where
    F: FnOnce(&mut DispatchContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
{
    Box::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::FnMiddleware;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn make_request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_response(body: &'static str) -> Response {
        http::Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    /// Records enter/leave order through the chain.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handle<'a>(
            &'a self,
            ctx: &'a mut DispatchContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}-before", self.name));
                let response = next.run(ctx, request).await;
                self.log.lock().unwrap().push(format!("{}-after", self.name));
                response
            })
        }
    }

    #[tokio::test]
    async fn test_onion_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let chain = MiddlewareChain::new()
            .stage(Recorder {
                name: "a",
                log: log.clone(),
            })
            .stage(Recorder {
                name: "b",
                log: log.clone(),
            });

        let mut ctx = DispatchContext::new();
        let terminal_log = log.clone();
        let response = chain
            .execute(
                &mut ctx,
                make_request("/"),
                terminal_fn(move |_ctx, _request| {
                    Box::pin(async move {
                        terminal_log.lock().unwrap().push("terminal".to_string());
                        ok_response("done")
                    })
                }),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a-before", "b-before", "terminal", "b-after", "a-after"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_stages() {
        let inner_ran = Arc::new(AtomicBool::new(false));
        let inner_flag = inner_ran.clone();

        let blocker = FnMiddleware::new("blocker", |_ctx, _request, _next| {
            Box::pin(async {
                http::Response::builder()
                    .status(StatusCode::SERVICE_UNAVAILABLE)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        });

        let witness = FnMiddleware::new("witness", move |ctx, request, next| {
            let flag = inner_flag.clone();
            Box::pin(async move {
                flag.store(true, Ordering::SeqCst);
                next.run(ctx, request).await
            })
        });

        let chain = MiddlewareChain::new().stage(blocker).stage(witness);

        let mut ctx = DispatchContext::new();
        let response = chain
            .execute(
                &mut ctx,
                make_request("/"),
                terminal_fn(|_ctx, _request| Box::pin(async { ok_response("unreachable") })),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!inner_ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_chain_runs_terminal_directly() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        let mut ctx = DispatchContext::new();
        let response = chain
            .execute(
                &mut ctx,
                make_request("/"),
                terminal_fn(|_ctx, _request| Box::pin(async { ok_response("handler") })),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_response_transform_on_the_way_out() {
        let tagger = FnMiddleware::new("tagger", |ctx, request, next| {
            Box::pin(async move {
                let mut response = next.run(ctx, request).await;
                response
                    .headers_mut()
                    .insert("x-chain", "passed".parse().unwrap());
                response
            })
        });

        let chain = MiddlewareChain::new().stage(tagger);
        let mut ctx = DispatchContext::new();
        let response = chain
            .execute(
                &mut ctx,
                make_request("/"),
                terminal_fn(|_ctx, _request| Box::pin(async { ok_response("inner") })),
            )
            .await;

        assert_eq!(response.headers().get("x-chain").unwrap(), "passed");
    }

    #[test]
    fn test_stage_names_in_order() {
        let chain = MiddlewareChain::new()
            .stage(FnMiddleware::new("first", |ctx, req, next| {
                Box::pin(next.run(ctx, req))
            }))
            .stage(FnMiddleware::new("second", |ctx, req, next| {
                Box::pin(next.run(ctx, req))
            }));

        assert_eq!(chain.stage_names(), vec!["first", "second"]);
        assert_eq!(chain.len(), 2);
    }
}
