//! Ordered route table and path matching for Talaria.
//!
//! This crate turns a tree of routes and path-prefixed scopes into a
//! single flattened, ordered table, then matches incoming method + path
//! pairs against it with first-match-wins semantics.
//!
//! # Matching model
//!
//! - Patterns are slash-separated; segments starting with `:` are named
//!   parameter placeholders (`/users/:id`).
//! - Empty segments are discarded on both sides, so leading and trailing
//!   slashes never affect a match.
//! - The table is scanned linearly in registration order (optionally
//!   pre-sorted by per-route priority, stable otherwise); the first route
//!   whose method filter and segments match wins. There is no
//!   most-specific-wins logic: `/users/:id` registered before
//!   `/users/new` shadows it, and that is the caller's choice to make.
//!
//! # Example
//!
//! ```rust
//! use talaria_router::{extract_params, RouteEntry, RouteTable};
//! use http::Method;
//!
//! let table = RouteTable::new(vec![
//!     RouteEntry::route(Method::GET, "/", "home"),
//!     RouteEntry::scope("/users", vec![
//!         RouteEntry::route(Method::GET, "/:id", "getUser"),
//!         RouteEntry::route(Method::GET, "/:id/:name", "getUserByName"),
//!     ]),
//! ]);
//!
//! let m = table.resolve(&Method::GET, "/users/123/john").unwrap();
//! assert_eq!(*m.route.handler(), "getUserByName");
//! assert_eq!(m.params.get("id"), Some("123"));
//! assert_eq!(m.params.get("name"), Some("john"));
//! ```
//!
//! The route target type is generic: this crate routes to any `H` (an
//! operation ID in tests, boxed handler functions in the dispatch layer).

#![doc(html_root_url = "https://docs.rs/talaria-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod flatten;
mod params;
mod route;
mod table;

pub use flatten::flatten;
pub use params::{extract_params, raw_param_names, PathParams};
pub use route::{MethodFilter, Route, RouteEntry, RouteScope};
pub use table::{RouteMatch, RouteTable};
