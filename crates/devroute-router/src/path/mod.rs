/// Path utilities for validation, normalization and nesting
///
/// All functions are pure: same input, same output, no side effects.

use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::PathHierarchy;

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use devroute_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/devices"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("devices"));
/// assert!(!is_valid_path("/devices/"));
/// assert!(!is_valid_path("/devices//new"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// - Trailing slashes: `/devices/` → `/devices`
/// - Double slashes: `/a//b` → `/a/b`
/// - Backslashes: `\a\b` → `/a/b`
/// - Missing leading slash: `devices` → `/devices`
///
/// # Examples
///
/// ```
/// use devroute_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/devices"), Cow::Borrowed("/devices")));
/// assert_eq!(normalize_path("devices/"), "/devices");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Computes the effective path of a nested entry
///
/// A child path starting with `/` is absolute and replaces the parent.
/// An empty child path resolves to the parent itself.
///
/// # Examples
///
/// ```
/// use devroute_router::path::join_paths;
///
/// assert_eq!(join_paths("/", "devices"), "/devices");
/// assert_eq!(join_paths("/admin", "users/:id"), "/admin/users/:id");
/// assert_eq!(join_paths("/admin", "/login"), "/login");
/// assert_eq!(join_paths("/admin", ""), "/admin");
/// ```
pub fn join_paths(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        return normalize_path(child).into_owned();
    }

    if child.is_empty() {
        return normalize_path(parent).into_owned();
    }

    normalize_path(&format!("{}/{}", parent, child)).into_owned()
}

/// Splits a path into its non-empty segments
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
