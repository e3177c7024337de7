//! Request ID middleware.
//!
//! Generates or propagates a unique request ID for each incoming
//! request and echoes it on the response, so clients can correlate
//! their requests with server logs.
//!
//! ## Request ID sources
//!
//! 1. **`x-request-id` header**: used when present and trusted
//! 2. **Generated UUID v7**: otherwise

use talaria_core::{BoxFuture, DispatchContext, Request, RequestId, Response};
use uuid::Uuid;

use crate::middleware::{Middleware, Next};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns each request a unique identifier.
///
/// The ID is stored on the [`DispatchContext`] for the rest of the
/// chain and always set as the `x-request-id` response header.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    /// Whether to trust incoming request ID headers.
    ///
    /// Typically `false` for external traffic and `true` for internal
    /// service-to-service calls.
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates fresh IDs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that trusts incoming `x-request-id` headers.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    /// Extracts a request ID from headers, if present and valid.
    fn extract_request_id(&self, request: &Request) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(RequestId::from_uuid)
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut DispatchContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = self
                .extract_request_id(&request)
                .unwrap_or_else(RequestId::new);

            ctx.set_request_id(request_id);

            let mut response = next.run(ctx, request).await;

            response.headers_mut().insert(
                REQUEST_ID_HEADER,
                request_id.to_string().parse().expect("valid header value"),
            );

            response
        })
    }
}
