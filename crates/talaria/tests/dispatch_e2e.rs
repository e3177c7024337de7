//! End-to-end dispatch integration tests.
//!
//! These tests exercise the full path a request takes through the
//! composed pipeline: middleware chain, route resolution, parameter
//! extraction, handler invocation, and fallback behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::Full;

use talaria::prelude::*;
use talaria::routes;
use talaria_middleware::terminal_fn;

fn make_request(method: Method, path: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn make_request_from(method: Method, path: &str, ip: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(path)
        .header("x-forwarded-for", ip)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn text(status: StatusCode, body: String) -> Response {
    http::Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

async fn body_string(response: Response) -> String {
    use http_body_util::BodyExt;
    let collected = response.into_body().collect().await.unwrap();
    String::from_utf8(collected.to_bytes().to_vec()).unwrap()
}

/// Routes `[GET /, GET /:id, GET /:id/:name]` against `GET /123/john`:
/// the third route wins and both parameters bind.
#[tokio::test]
async fn deepest_pattern_matches_by_segment_count() {
    let dispatcher = build_dispatcher(vec![
        routes::get("/", |_request, _params| async {
            text(StatusCode::OK, "home".to_string())
        }),
        routes::get("/:id", |_request, params| {
            let id = params.get("id").unwrap_or("?").to_string();
            async move { text(StatusCode::OK, format!("id={id}")) }
        }),
        routes::get("/:id/:name", |_request, params| {
            let id = params.get("id").unwrap_or("?").to_string();
            let name = params.get("name").unwrap_or("?").to_string();
            async move { text(StatusCode::OK, format!("id={id},name={name}")) }
        }),
    ]);

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    let mut ctx = DispatchContext::new();
    let response = pipeline
        .call_with_context(&mut ctx, make_request(Method::GET, "/123/john"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "id=123,name=john");
    assert_eq!(ctx.matched_pattern(), Some("/:id/:name"));
    assert_eq!(ctx.path_params().get("id"), Some("123"));
    assert_eq!(ctx.path_params().get("name"), Some("john"));
}

#[tokio::test]
async fn registration_order_decides_overlapping_routes() {
    let dispatcher = build_dispatcher(vec![
        routes::get("/users/:id", |_request, _params| async {
            text(StatusCode::OK, "param".to_string())
        }),
        routes::get("/users/new", |_request, _params| async {
            text(StatusCode::OK, "literal".to_string())
        }),
    ]);

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    let response = pipeline.call(make_request(Method::GET, "/users/new")).await;

    // First registration wins; /users/new is shadowed by design.
    assert_eq!(body_string(response).await, "param");
}

#[tokio::test]
async fn wildcard_method_route_matches_every_verb() {
    let dispatcher = build_dispatcher(vec![routes::any("/ping", |_request, _params| async {
        text(StatusCode::OK, "pong".to_string())
    })]);

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    for method in [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ] {
        let response = pipeline.call(make_request(method.clone(), "/ping")).await;
        assert_eq!(response.status(), StatusCode::OK, "method {method}");
    }
}

#[tokio::test]
async fn nested_scopes_concatenate_prefixes() {
    let dispatcher = build_dispatcher(vec![routes::scope(
        "/api",
        vec![routes::scope(
            "/v1",
            vec![routes::get("/users/:userId/posts/:postId", |_request, params| {
                let user = params.get("userId").unwrap_or("?").to_string();
                let post = params.get("postId").unwrap_or("?").to_string();
                async move { text(StatusCode::OK, format!("{user}/{post}")) }
            })],
        )],
    )]);

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    let response = pipeline
        .call(make_request(Method::GET, "/api/v1/users/42/posts/99"))
        .await;

    assert_eq!(body_string(response).await, "42/99");
}

#[tokio::test]
async fn unmatched_request_hits_the_fallback() {
    let dispatcher = build_dispatcher(vec![routes::get("/known", |_request, _params| async {
        text(StatusCode::OK, "known".to_string())
    })]);

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    let response = pipeline.call(make_request(Method::GET, "/unknown")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_fallback_replaces_the_404() {
    let dispatcher = build_dispatcher(vec![]).with_fallback(Handler::new(
        |_request, _params| async { text(StatusCode::OK, "served from disk".to_string()) },
    ));

    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);
    let response = pipeline.call(make_request(Method::GET, "/styles.css")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "served from disk");
}

#[tokio::test]
async fn middleware_short_circuit_keeps_handler_untouched() {
    let handler_ran = Arc::new(AtomicBool::new(false));

    let flag = handler_ran.clone();
    let dispatcher = build_dispatcher(vec![routes::get("/", move |_request, _params| {
        let flag = flag.clone();
        async move {
            flag.store(true, Ordering::SeqCst);
            text(StatusCode::OK, "handler".to_string())
        }
    })]);

    let gate = FnMiddleware::new("maintenance", |_ctx, _request, _next| {
        Box::pin(async {
            Response::json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "MAINTENANCE",
                "down for maintenance",
            )
        })
    });

    let pipeline = compose_middleware(MiddlewareChain::new().stage(gate), dispatcher);
    let response = pipeline.call(make_request(Method::GET, "/")).await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!handler_ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn full_pipeline_with_request_id_and_rate_limit() {
    let dispatcher = build_dispatcher(vec![routes::get("/api/data", |_request, _params| async {
        text(StatusCode::OK, "data".to_string())
    })]);

    let chain = MiddlewareChain::new()
        .stage(RequestIdMiddleware::new())
        .stage(RateLimitMiddleware::builder().max_requests(2).build());
    let pipeline = compose_middleware(chain, dispatcher);

    let first = pipeline
        .call(make_request_from(Method::GET, "/api/data", "5.5.5.5"))
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers().contains_key("x-request-id"));
    assert_eq!(first.headers().get("x-ratelimit-remaining").unwrap(), "1");

    let second = pipeline
        .call(make_request_from(Method::GET, "/api/data", "5.5.5.5"))
        .await;
    assert_eq!(second.status(), StatusCode::OK);

    let third = pipeline
        .call(make_request_from(Method::GET, "/api/data", "5.5.5.5"))
        .await;
    assert_eq!(third.status(), StatusCode::TOO_MANY_REQUESTS);
    // The rejection happens before dispatch, but still carries the
    // request ID stamped by the outer stage.
    assert!(third.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn rate_limited_pipeline_rejects_anonymous_clients() {
    let dispatcher = build_dispatcher(vec![routes::get("/api/data", |_request, _params| async {
        text(StatusCode::OK, "data".to_string())
    })]);

    let pipeline = compose_middleware(
        MiddlewareChain::new().stage(RateLimitMiddleware::builder().build()),
        dispatcher,
    );

    let response = pipeline.call(make_request(Method::GET, "/api/data")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn priority_moves_literal_route_ahead_of_parameter_route() {
    use talaria_router::{MethodFilter, Route, RouteEntry};

    let param_route = routes::get("/users/:id", |_request, _params| async {
        text(StatusCode::OK, "param".to_string())
    });
    let literal_route = RouteEntry::Route(
        Route::new(
            MethodFilter::Only(Method::GET),
            "/users/new",
            Handler::new(|_request, _params| async {
                text(StatusCode::OK, "literal".to_string())
            }),
        )
        .with_priority(1),
    );

    let dispatcher = build_dispatcher(vec![param_route, literal_route]);
    let pipeline = compose_middleware(MiddlewareChain::new(), dispatcher);

    let response = pipeline.call(make_request(Method::GET, "/users/new")).await;
    assert_eq!(body_string(response).await, "literal");

    let response = pipeline.call(make_request(Method::GET, "/users/7")).await;
    assert_eq!(body_string(response).await, "param");
}

#[tokio::test]
async fn chain_executes_with_explicit_terminal() {
    // The chain executor is usable standalone, without a dispatcher.
    let chain = MiddlewareChain::new().stage(RequestIdMiddleware::new());
    let mut ctx = DispatchContext::new();

    let response = chain
        .execute(
            &mut ctx,
            make_request(Method::GET, "/"),
            terminal_fn(|_ctx, _request| {
                Box::pin(async { text(StatusCode::ACCEPTED, "raw terminal".to_string()) })
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
