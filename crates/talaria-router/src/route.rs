//! Route definitions.
//!
//! A [`Route`] binds an HTTP method filter and a path pattern to an
//! arbitrary dispatch target `H` (an operation ID, a handler function,
//! whatever the consuming crate routes to). Routes can be grouped into
//! recursively nested, path-prefixed [`RouteScope`]s; the two cases are
//! discriminated by the [`RouteEntry`] tag.

use http::Method;

/// Which request methods a route accepts.
///
/// `Any` is the method wildcard: the route matches every verb at its path.
///
/// # Example
///
/// ```rust
/// use talaria_router::MethodFilter;
/// use http::Method;
///
/// assert!(MethodFilter::Any.accepts(&Method::PATCH));
/// assert!(MethodFilter::Only(Method::GET).accepts(&Method::GET));
/// assert!(!MethodFilter::Only(Method::GET).accepts(&Method::POST));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodFilter {
    /// Matches every HTTP method.
    Any,
    /// Matches exactly one HTTP method.
    Only(Method),
}

impl MethodFilter {
    /// Returns true if this filter accepts the given request method.
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(m) => m == method,
        }
    }
}

impl From<Method> for MethodFilter {
    fn from(method: Method) -> Self {
        Self::Only(method)
    }
}

/// A single registered route.
///
/// The path pattern is a slash-separated string where segments starting
/// with `:` are parameter placeholders (`/users/:id`). Patterns are
/// immutable once the route table is built; parameter names must be unique
/// within one pattern.
///
/// `H` is the dispatch target the route resolves to.
#[derive(Debug, Clone)]
pub struct Route<H> {
    /// Method filter for this route.
    method: MethodFilter,

    /// Path pattern, rewritten to include scope prefixes during flattening.
    pattern: String,

    /// The dispatch target.
    handler: H,

    /// Tie-break used to pre-sort the flattened table, higher first.
    priority: i32,
}

impl<H> Route<H> {
    /// Creates a new route with default priority.
    pub fn new(method: impl Into<MethodFilter>, pattern: impl Into<String>, handler: H) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler,
            priority: 0,
        }
    }

    /// Sets the match priority. Higher-priority routes are consulted first;
    /// equal priorities keep registration order.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns the method filter.
    #[must_use]
    pub fn method(&self) -> &MethodFilter {
        &self.method
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the dispatch target.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the match priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Rewrites the pattern to include a scope prefix.
    ///
    /// Plain string concatenation: the caller owns the slashes.
    pub(crate) fn prepend_prefix(&mut self, prefix: &str) {
        self.pattern = format!("{prefix}{}", self.pattern);
    }
}

/// A path-prefixed group of routes and nested scopes.
///
/// Scopes form a tree; prefixes concatenate left-to-right with no slash
/// normalization beyond plain string concatenation.
#[derive(Debug, Clone)]
pub struct RouteScope<H> {
    /// Prefix prepended to every child pattern.
    prefix: String,

    /// Child routes and scopes, in registration order.
    entries: Vec<RouteEntry<H>>,
}

impl<H> RouteScope<H> {
    /// Creates a new scope.
    pub fn new(prefix: impl Into<String>, entries: Vec<RouteEntry<H>>) -> Self {
        Self {
            prefix: prefix.into(),
            entries,
        }
    }

    /// Returns the scope prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the child entries.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry<H>] {
        &self.entries
    }

    pub(crate) fn into_parts(self) -> (String, Vec<RouteEntry<H>>) {
        (self.prefix, self.entries)
    }
}

/// One element of a route tree: a concrete route or a nested scope.
///
/// Explicitly tagged so the two cases are discriminated by the enum
/// variant, not by structural inspection.
#[derive(Debug, Clone)]
pub enum RouteEntry<H> {
    /// A concrete route.
    Route(Route<H>),
    /// A path-prefixed group of entries.
    Scope(RouteScope<H>),
}

impl<H> RouteEntry<H> {
    /// Creates a route entry.
    pub fn route(
        method: impl Into<MethodFilter>,
        pattern: impl Into<String>,
        handler: H,
    ) -> Self {
        Self::Route(Route::new(method, pattern, handler))
    }

    /// Creates a scope entry.
    pub fn scope(prefix: impl Into<String>, entries: Vec<RouteEntry<H>>) -> Self {
        Self::Scope(RouteScope::new(prefix, entries))
    }
}

impl<H> From<Route<H>> for RouteEntry<H> {
    fn from(route: Route<H>) -> Self {
        Self::Route(route)
    }
}

impl<H> From<RouteScope<H>> for RouteEntry<H> {
    fn from(scope: RouteScope<H>) -> Self {
        Self::Scope(scope)
    }
}
