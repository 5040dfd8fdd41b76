//! Path canonicalization, zone classification and route matching.

pub mod matcher;
pub mod similarity;

pub use matcher::{MatchOutcome, RouteSet};

use crate::types::Zone;

const AUTH_MARKERS: &[&str] = &[
    "/dashboard",
    "/profile",
    "/settings",
    "/account",
    "/my-",
    "/edit-",
    "/messages",
    "/certificates",
];

/// Canonical form of a route or link path.
///
/// Query and fragment are dropped, trailing slashes are removed except on
/// the root, and catch-all spellings (`""`, `"*"`, `"/*"`) have no route.
#[must_use]
pub fn normalize(path: &str) -> Option<String> {
    let (bare, _) = split_suffix(path);
    let bare = bare.trim();
    if matches!(bare, "" | "*" | "/*") {
        return None;
    }
    let trimmed = bare.trim_end_matches('/');
    if trimmed.is_empty() {
        return Some("/".to_string());
    }
    Some(trimmed.to_string())
}

/// Splits `path` at the first `?` or `#`, keeping the delimiter in the suffix.
#[must_use]
pub fn split_suffix(path: &str) -> (&str, &str) {
    match path.find(['?', '#']) {
        Some(i) => path.split_at(i),
        None => (path, ""),
    }
}

/// Path segments after the leading slash. The root has none.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[must_use]
pub fn is_parameter(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*')
}

#[must_use]
pub fn has_parameters(pattern: &str) -> bool {
    segments(pattern).into_iter().any(is_parameter)
}

/// Coarse zone of a route pattern.
#[must_use]
pub fn classify_zone(path: &str) -> Zone {
    let lower = path.to_ascii_lowercase();
    if lower.contains("/admin") {
        return Zone::Admin;
    }
    if AUTH_MARKERS.iter().any(|m| lower.contains(m)) {
        return Zone::Auth;
    }
    Zone::Public
}

/// Zone of a source file, judged by where it lives.
#[must_use]
pub fn file_zone(file: &str) -> Zone {
    classify_zone(&format!("/{}", file.replace('\\', "/")))
}

/// True if `target` equals `prefix` or continues it with `/`, `?` or `#`.
#[must_use]
pub fn has_segment_prefix(target: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match target.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#', '.']),
        None => false,
    }
}
