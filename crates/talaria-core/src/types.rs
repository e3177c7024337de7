//! Common HTTP types used throughout the dispatch core.
//!
//! This module re-exports the request and response types every layer of
//! the core operates on.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;

/// The HTTP request type flowing through the dispatch core.
///
/// A standard `http::Request` with a `Full<Bytes>` body; the host server
/// loop owns connection handling and produces these already parsed.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by handlers and middleware.
pub type Response = http::Response<Full<Bytes>>;

/// The serialized shape of a JSON error response.
#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
}

/// Extension trait for building error responses.
pub trait ResponseExt {
    /// Creates a plain-text error response with the given status code.
    fn error(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON error response in the standard envelope:
    /// `{"error":{"code":...,"message":...}}`.
    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response;
}

impl ResponseExt for Response {
    fn error(status: http::StatusCode, message: &str) -> Response {
        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Full::new(Bytes::from(message.to_string())))
            .expect("failed to build error response")
    }

    fn json_error(status: http::StatusCode, code: &str, message: &str) -> Response {
        let envelope = ErrorEnvelope {
            error: ErrorDetail { code, message },
        };
        let body = serde_json::to_vec(&envelope).expect("failed to serialize error envelope");

        http::Response::builder()
            .status(status)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .expect("failed to build JSON error response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::BAD_REQUEST, "Invalid input");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_json_error_envelope() {
        let response = Response::json_error(
            StatusCode::NOT_FOUND,
            "RESOURCE_NOT_FOUND",
            "No route matched",
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"]["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(parsed["error"]["message"], "No route matched");
    }
}
