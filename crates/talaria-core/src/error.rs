//! Error types for the dispatch core.
//!
//! [`Error`] is the standard error type used by handlers and middleware.
//! Each variant maps to an HTTP status code and a stable error code used
//! in the JSON envelope `{"error":{"code","message"}}`.
//!
//! The routing layer never constructs these: absent matches are reported
//! as values, not errors. Handlers use the variants to fail requests, and
//! [`Error::into_response`] converts them at the response boundary.

use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Response, ResponseExt};

/// Result type alias using [`Error`].
pub type DispatchResult<T> = Result<T, Error>;

/// Categories of errors for classification and status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request validation errors (invalid or missing input).
    Validation,
    /// Resource not found.
    NotFound,
    /// Rate limiting.
    RateLimited,
    /// Internal server errors.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the stable error code used in response envelopes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "RESOURCE_NOT_FOUND",
            Self::RateLimited => "RATE_LIMIT_EXCEEDED",
            Self::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Standard error type for the dispatch core.
///
/// # Example
///
/// ```
/// use talaria_core::Error;
///
/// fn lookup(id: &str) -> Result<String, Error> {
///     if id.is_empty() {
///         return Err(Error::validation("id must not be empty"));
///     }
///     Ok(id.to_string())
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Request rate limit exceeded.
    #[error("Rate limit exceeded, retry in {retry_after:?}")]
    RateLimited {
        /// Time until the client's window resets.
        retry_after: Duration,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a rate-limited error.
    #[must_use]
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::RateLimited { .. } => ErrorCategory::RateLimited,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error into a JSON error response.
    #[must_use]
    pub fn into_response(self) -> Response {
        let message = self.to_string();
        Response::json_error(self.status_code(), self.category().error_code(), &message)
    }
}
