//! Route tree flattening.
//!
//! Turns a tree of routes and nested scopes into a single ordered list of
//! concrete routes, with every pattern rewritten to include its scope
//! prefixes. The traversal is depth-first and order-preserving, which is
//! what gives the route table its first-match-wins semantics.

use crate::route::{Route, RouteEntry};

/// Flattens a route tree into an ordered route list.
///
/// Scopes are traversed depth-first; each child pattern becomes
/// `prefix + pattern` by plain string concatenation. Duplicate patterns
/// are legal and never merged; registration order alone resolves them.
///
/// # Example
///
/// ```rust
/// use talaria_router::{flatten, RouteEntry};
/// use http::Method;
///
/// let routes = flatten(vec![
///     RouteEntry::scope("/api", vec![
///         RouteEntry::route(Method::GET, "/users", "listUsers"),
///         RouteEntry::scope("/admin", vec![
///             RouteEntry::route(Method::POST, "/reset", "reset"),
///         ]),
///     ]),
///     RouteEntry::route(Method::GET, "/health", "health"),
/// ]);
///
/// let patterns: Vec<_> = routes.iter().map(|r| r.pattern()).collect();
/// assert_eq!(patterns, vec!["/api/users", "/api/admin/reset", "/health"]);
/// ```
#[must_use]
pub fn flatten<H>(entries: Vec<RouteEntry<H>>) -> Vec<Route<H>> {
    let mut routes = Vec::new();
    flatten_into("", entries, &mut routes);
    routes
}

fn flatten_into<H>(prefix: &str, entries: Vec<RouteEntry<H>>, out: &mut Vec<Route<H>>) {
    for entry in entries {
        match entry {
            RouteEntry::Route(mut route) => {
                if !prefix.is_empty() {
                    route.prepend_prefix(prefix);
                }
                out.push(route);
            }
            RouteEntry::Scope(scope) => {
                let (scope_prefix, children) = scope.into_parts();
                let child_prefix = format!("{prefix}{scope_prefix}");
                flatten_into(&child_prefix, children, out);
            }
        }
    }
}
