//! Rate limiting middleware.
//!
//! Enforces a per-client request ceiling over a fixed time window.
//!
//! ## Algorithm
//!
//! Fixed window with lazy reset: each client key owns a counter and a
//! window expiry. The first request observed after the expiry resets the
//! counter in place and starts a fresh window; there is no background
//! sweep and no timer thread. The cost of that choice is that an idle
//! key keeps its stale record until its next request, and keys for
//! clients that never return are retained for the life of the process,
//! a known, accepted growth tradeoff.
//!
//! ## Client keys
//!
//! The key is the client IP, derived from forwarded-IP headers in
//! priority order: the first value of `x-forwarded-for`, then
//! `cf-connecting-ip`, then `x-real-ip`. A request carrying none of
//! these is rejected with a 400 response; silently skipping the limit
//! would defeat it.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use talaria_middleware::stages::RateLimitMiddleware;
//!
//! let rate_limit = RateLimitMiddleware::builder()
//!     .max_requests(100)
//!     .window(Duration::from_secs(60))
//!     .build();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{header, HeaderValue, StatusCode};
use tokio::sync::Mutex;

use talaria_core::{BoxFuture, DispatchContext, Request, Response, ResponseExt};

use crate::middleware::{Middleware, Next};

/// Rate limit header names.
pub mod headers {
    /// Maximum requests allowed in the window.
    pub const LIMIT: &str = "x-ratelimit-limit";
    /// Remaining requests in the current window.
    pub const REMAINING: &str = "x-ratelimit-remaining";
    /// Seconds until the window resets.
    pub const RESET_AFTER: &str = "x-ratelimit-reset-after";
}

// Forwarded-IP headers consulted for the client key, in priority order.
const FORWARDED_FOR: &str = "x-forwarded-for";
const CDN_CONNECTING_IP: &str = "cf-connecting-ip";
const REAL_IP: &str = "x-real-ip";

/// Time source for window arithmetic.
///
/// Production uses [`SystemClock`]; tests substitute a manual clock to
/// cross window boundaries without sleeping.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// The default [`Clock`], backed by `Instant::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the rate limiting middleware.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum number of requests allowed per window.
    max_requests: u64,
    /// Length of the counting window.
    window: Duration,
    /// Message returned on rejected requests.
    error_message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            error_message: "Too many requests. Please try again later.".to_string(),
        }
    }
}

/// Counter state for a single client key.
///
/// Entries are reset in place when the window elapses, never removed.
#[derive(Debug, Clone)]
struct WindowEntry {
    /// Requests counted in the current window.
    count: u64,
    /// When the current window expires.
    reset_at: Instant,
}

/// Rate limiting middleware.
///
/// The key → window map is owned by this instance and guarded by a
/// mutex; the full lookup / lazy-reset / increment / compare sequence
/// for a request runs under a single lock acquisition, so two
/// concurrent requests for one key can never both slip under the limit.
///
/// Cloning shares the underlying map, so one limiter can participate in
/// several chains while enforcing a single combined ceiling.
#[derive(Debug)]
pub struct RateLimitMiddleware {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    store: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

impl std::fmt::Debug for dyn Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Clock")
    }
}

impl Clone for RateLimitMiddleware {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            store: Arc::clone(&self.store),
        }
    }
}

/// Builder for [`RateLimitMiddleware`].
#[derive(Debug, Default)]
pub struct RateLimitBuilder {
    config: RateLimitConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl RateLimitBuilder {
    /// Creates a builder with default settings (100 requests / 60s).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of requests allowed per window.
    #[must_use]
    pub fn max_requests(mut self, max_requests: u64) -> Self {
        self.config.max_requests = max_requests;
        self
    }

    /// Sets the counting window.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.config.window = window;
        self
    }

    /// Sets the counting window in seconds.
    #[must_use]
    pub fn window_secs(self, seconds: u64) -> Self {
        self.window(Duration::from_secs(seconds))
    }

    /// Sets the message returned on rejected requests.
    #[must_use]
    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.config.error_message = message.into();
        self
    }

    /// Overrides the time source used for window arithmetic.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the middleware with an empty window map.
    #[must_use]
    pub fn build(self) -> RateLimitMiddleware {
        RateLimitMiddleware {
            config: self.config,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone)]
enum RateLimitOutcome {
    /// Request is within the limit.
    Allowed {
        remaining: u64,
        reset_in: Duration,
    },
    /// Request exceeds the limit.
    Limited { reset_in: Duration },
}

impl RateLimitMiddleware {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> RateLimitBuilder {
        RateLimitBuilder::new()
    }

    /// Returns the configured per-window ceiling.
    #[must_use]
    pub fn max_requests(&self) -> u64 {
        self.config.max_requests
    }

    /// Returns the configured window length.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.config.window
    }

    /// Derives the client key from forwarded-IP headers.
    ///
    /// `x-forwarded-for` may carry a comma-separated chain; the first
    /// entry is the originating client.
    fn client_key(request: &Request) -> Option<String> {
        if let Some(value) = request
            .headers()
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
        {
            let first = value.split(',').next().map(str::trim).unwrap_or("");
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }

        for name in [CDN_CONNECTING_IP, REAL_IP] {
            if let Some(value) = request.headers().get(name).and_then(|v| v.to_str().ok()) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }

        None
    }

    /// Counts a request against a key's window.
    ///
    /// The whole read-modify-write sequence holds the store lock: the
    /// lazy window reset, the increment, and the threshold comparison
    /// are one critical section.
    async fn check(&self, key: &str) -> RateLimitOutcome {
        let mut store = self.store.lock().await;
        let now = self.clock.now();
        let window = self.config.window;

        let entry = store.entry(key.to_string()).or_insert_with(|| WindowEntry {
            count: 0,
            reset_at: now + window,
        });

        // Fresh window begins lazily on the first request after expiry.
        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }

        entry.count += 1;
        let reset_in = entry.reset_at.saturating_duration_since(now);

        if entry.count > self.config.max_requests {
            RateLimitOutcome::Limited { reset_in }
        } else {
            RateLimitOutcome::Allowed {
                remaining: self.config.max_requests - entry.count,
                reset_in,
            }
        }
    }

    /// Builds the 429 response for a rejected request.
    fn limited_response(&self, reset_in: Duration) -> Response {
        let retry_after = reset_in.as_secs().max(1);

        let mut response = Response::json_error(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_EXCEEDED",
            &self.config.error_message,
        );

        let headers = response.headers_mut();
        headers.insert(headers::LIMIT, HeaderValue::from(self.config.max_requests));
        headers.insert(headers::REMAINING, HeaderValue::from(0u64));
        headers.insert(headers::RESET_AFTER, HeaderValue::from(retry_after));
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));

        response
    }

    /// Decorates an allowed response with quota headers.
    fn with_quota_headers(
        &self,
        mut response: Response,
        remaining: u64,
        reset_in: Duration,
    ) -> Response {
        let headers = response.headers_mut();
        headers.insert(headers::LIMIT, HeaderValue::from(self.config.max_requests));
        headers.insert(headers::REMAINING, HeaderValue::from(remaining));
        headers.insert(headers::RESET_AFTER, HeaderValue::from(reset_in.as_secs()));
        response
    }
}

impl Middleware for RateLimitMiddleware {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut DispatchContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(key) = Self::client_key(&request) else {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    "no forwarded-ip header present, rejecting request"
                );
                return Response::json_error(
                    StatusCode::BAD_REQUEST,
                    "MISSING_CLIENT_ADDRESS",
                    "Unable to determine the client address for rate limiting",
                );
            };

            match self.check(&key).await {
                RateLimitOutcome::Allowed {
                    remaining,
                    reset_in,
                } => {
                    let response = next.run(ctx, request).await;
                    self.with_quota_headers(response, remaining, reset_in)
                }
                RateLimitOutcome::Limited { reset_in } => {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        client = %key,
                        retry_in = ?reset_in,
                        "rate limit exceeded"
                    );
                    self.limited_response(reset_in)
                }
            }
        })
    }
}
