//! Path parameter extraction and storage.
//!
//! This module provides efficient storage for extracted path parameters
//! using a small-vector optimization to avoid heap allocations for
//! common cases (1-4 parameters).

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Extracted path parameters from a route match.
///
/// Uses small-vector optimization to avoid heap allocation for common
/// cases with few parameters. Parameters are stored as (name, value) pairs
/// in pattern declaration order.
///
/// # Example
///
/// ```rust
/// use talaria_router::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("userId", "123");
/// params.push("action", "view");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get("action"), Some("view"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    /// Storage for parameter (name, value) pairs
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Binds each `:name` segment of a route pattern to the request path
/// segment at the same index.
///
/// Both pattern and path are split on `/` with empty segments discarded,
/// so leading and trailing slashes are insignificant. Literal segments are
/// skipped; their equality is the matcher's responsibility. Values are the
/// literal path segments, with no decoding or coercion applied.
///
/// This is a total function: it never fails, even on a path the pattern
/// would not match.
///
/// # Example
///
/// ```rust
/// use talaria_router::extract_params;
///
/// let params = extract_params("/users/:id/posts/:postId", "/users/42/posts/99");
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get("postId"), Some("99"));
/// ```
#[must_use]
pub fn extract_params(pattern: &str, path: &str) -> PathParams {
    let path_segments: SmallVec<[&str; 8]> =
        path.split('/').filter(|s| !s.is_empty()).collect();

    let mut params = PathParams::new();
    for (index, segment) in pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if let Some(name) = segment.strip_prefix(':') {
            if let Some(value) = path_segments.get(index) {
                params.push(name, *value);
            }
        }
    }
    params
}

/// Returns the parameter names of a route pattern in declaration order.
///
/// Does not require a request path; used by documentation and schema
/// generators that introspect registered routes.
///
/// # Example
///
/// ```rust
/// use talaria_router::raw_param_names;
///
/// let names = raw_param_names("/orgs/:orgId/users/:userId");
/// assert_eq!(names, vec!["orgId", "userId"]);
/// ```
#[must_use]
pub fn raw_param_names(pattern: &str) -> Vec<&str> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.strip_prefix(':'))
        .collect()
}
