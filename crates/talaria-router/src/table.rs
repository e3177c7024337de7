//! The flattened, ordered route table.
//!
//! A [`RouteTable`] is built once at startup from a route tree and is
//! read-only afterwards, so it can be shared across concurrent requests
//! without synchronization. Matching is a linear scan in table order with
//! first-match-wins semantics: callers control precedence through
//! registration order (and the optional per-route priority, which only
//! pre-sorts the table before the first match).

use http::Method;
use smallvec::SmallVec;

use crate::flatten::flatten;
use crate::params::{extract_params, PathParams};
use crate::route::{Route, RouteEntry};

/// A segment of a parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    /// A literal segment (e.g. "users").
    Literal(String),

    /// A parameter placeholder (e.g. ":id"), matching any single
    /// non-empty segment.
    Param(String),
}

/// A route with its pattern pre-parsed for matching.
#[derive(Debug, Clone)]
struct CompiledRoute<H> {
    segments: Vec<PatternSegment>,
    route: Route<H>,
}

impl<H> CompiledRoute<H> {
    fn new(route: Route<H>) -> Self {
        let segments = route
            .pattern()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.strip_prefix(':').map_or_else(
                    || PatternSegment::Literal(s.to_string()),
                    |name| PatternSegment::Param(name.to_string()),
                )
            })
            .collect();
        Self { segments, route }
    }

    /// Checks this route's pattern against pre-split path segments.
    fn matches(&self, path_segments: &[&str]) -> bool {
        if self.segments.len() != path_segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .all(|(pattern, actual)| match pattern {
                PatternSegment::Literal(expected) => expected == actual,
                PatternSegment::Param(_) => true,
            })
    }
}

/// A successful table lookup: the route plus its extracted parameters.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a, H> {
    /// The matched route.
    pub route: &'a Route<H>,
    /// Parameters bound from the request path.
    pub params: PathParams,
}

/// The materialized, ordered route table.
///
/// Built once from a route tree; immutable for the life of the process.
///
/// # Example
///
/// ```rust
/// use talaria_router::{RouteEntry, RouteTable};
/// use http::Method;
///
/// let table = RouteTable::new(vec![
///     RouteEntry::route(Method::GET, "/users", "listUsers"),
///     RouteEntry::route(Method::GET, "/users/:id", "getUser"),
/// ]);
///
/// let found = table.find(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*found.handler(), "getUser");
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<CompiledRoute<H>>,
}

impl<H> RouteTable<H> {
    /// Flattens the route tree and builds the table.
    ///
    /// Routes are pre-sorted by descending priority; the sort is stable,
    /// so equal priorities keep registration order.
    #[must_use]
    pub fn new(entries: Vec<RouteEntry<H>>) -> Self {
        let mut flat = flatten(entries);
        flat.sort_by_key(|route| std::cmp::Reverse(route.priority()));

        Self {
            routes: flat.into_iter().map(CompiledRoute::new).collect(),
        }
    }

    /// Finds the first route matching the request method and path.
    ///
    /// A route matches when its method filter accepts the request method,
    /// segment counts are equal (empty segments discarded on both sides),
    /// and every segment pair is either a placeholder or byte-equal.
    ///
    /// Absence of a match is a value, not an error: the caller decides
    /// the fallback behavior.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<&Route<H>> {
        let path_segments: SmallVec<[&str; 8]> =
            path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes
            .iter()
            .find(|compiled| {
                compiled.route.method().accepts(method) && compiled.matches(&path_segments)
            })
            .map(|compiled| &compiled.route)
    }

    /// Finds a route and extracts its path parameters in one call.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        self.find(method, path).map(|route| RouteMatch {
            route,
            params: extract_params(route.pattern(), path),
        })
    }

    /// Returns the number of routes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<H>> {
        self.routes.iter().map(|compiled| &compiled.route)
    }
}
