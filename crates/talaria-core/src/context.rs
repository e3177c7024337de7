//! Per-request context types.
//!
//! The [`DispatchContext`] carries per-request state through the
//! middleware chain and into the dispatcher: the request ID, timing, the
//! matched route (once dispatch resolves it), and a typed extension map
//! middleware stages use to pass data inward.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use talaria_router::PathParams;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use talaria_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    ///
    /// Useful when parsing request IDs from headers.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Context that flows through the middleware chain and the dispatcher.
///
/// The context is mutable during chain execution so stages can enrich it
/// (request ID, rate-limit state via extensions). When the dispatcher
/// resolves a route it records the matched pattern and extracted path
/// parameters here, making them available to response-construction
/// collaborators on the way out.
///
/// # Example
///
/// ```
/// use talaria_core::DispatchContext;
///
/// let ctx = DispatchContext::new();
/// assert!(ctx.matched_pattern().is_none());
/// assert!(ctx.path_params().is_empty());
/// ```
#[derive(Debug)]
pub struct DispatchContext {
    /// Unique identifier for this request.
    request_id: RequestId,

    /// When the request started processing.
    started_at: Instant,

    /// Pattern of the matched route, set by the dispatcher.
    matched_pattern: Option<String>,

    /// Path parameters extracted for the matched route.
    path_params: PathParams,

    /// Type-erased extension data.
    ///
    /// Middleware can store arbitrary data here using type-safe keys.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DispatchContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a context with a specific request ID.
    ///
    /// Useful when the ID was provided by a client or upstream service.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            started_at: Instant::now(),
            matched_pattern: None,
            path_params: PathParams::new(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    ///
    /// This should only be called by the request-id middleware stage.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the pattern of the matched route, if dispatch resolved one.
    #[must_use]
    pub fn matched_pattern(&self) -> Option<&str> {
        self.matched_pattern.as_deref()
    }

    /// Returns the path parameters extracted for the matched route.
    ///
    /// Empty until the dispatcher resolves a route.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Records the matched route.
    ///
    /// This should only be called by the dispatcher.
    pub fn set_matched_route(&mut self, pattern: impl Into<String>, params: PathParams) {
        self.matched_pattern = Some(pattern.into());
        self.path_params = params;
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use talaria_core::DispatchContext;
    ///
    /// #[derive(Clone)]
    /// struct QuotaRemaining(u64);
    ///
    /// let mut ctx = DispatchContext::new();
    /// ctx.set_extension(QuotaRemaining(99));
    ///
    /// assert_eq!(ctx.get_extension::<QuotaRemaining>().unwrap().0, 99);
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_roundtrip() {
        let uuid = Uuid::now_v7();
        let id = RequestId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_request_ids_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_new_context_has_no_match() {
        let ctx = DispatchContext::new();
        assert!(ctx.matched_pattern().is_none());
        assert!(ctx.path_params().is_empty());
    }

    #[test]
    fn test_set_matched_route() {
        let mut ctx = DispatchContext::new();
        let mut params = PathParams::new();
        params.push("id", "123");

        ctx.set_matched_route("/users/:id", params);

        assert_eq!(ctx.matched_pattern(), Some("/users/:id"));
        assert_eq!(ctx.path_params().get("id"), Some("123"));
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Marker(i32);

        let mut ctx = DispatchContext::new();
        assert!(!ctx.has_extension::<Marker>());

        ctx.set_extension(Marker(42));
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker(42)));

        let removed = ctx.remove_extension::<Marker>();
        assert_eq!(removed, Some(Marker(42)));
        assert!(!ctx.has_extension::<Marker>());
    }

    #[test]
    fn test_elapsed_time() {
        let ctx = DispatchContext::new();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(10));
    }
}
