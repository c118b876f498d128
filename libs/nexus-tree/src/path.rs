//! Path helpers for slash-separated HDF5 paths.
//!
//! All paths stored in a [`GroupTree`](crate::GroupTree) are absolute and
//! normalized: one leading `/`, no empty, `.` or `..` segments, no trailing
//! slash.

/// Normalizes a path, resolving `.` and `..` segments.
///
/// # Example
///
/// ```rust
/// use nexus_tree::path::normalize;
///
/// assert_eq!(normalize("entry//sample/./x"), "/entry/sample/x");
/// assert_eq!(normalize("/entry/sample/../instrument"), "/entry/instrument");
/// ```
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Returns the parent group of a normalized path (`/` for top-level paths).
///
/// # Example
///
/// ```rust
/// use nexus_tree::path::parent;
///
/// assert_eq!(parent("/entry/sample"), "/entry");
/// assert_eq!(parent("/entry"), "/");
/// ```
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

/// Joins a relative path onto a base group and normalizes the result.
pub fn join(base: &str, relative: &str) -> String {
    normalize(&format!("{base}/{relative}"))
}

/// Name used for a node outside the file: the path without its entry group.
///
/// # Example
///
/// ```rust
/// use nexus_tree::path::display_name;
///
/// assert_eq!(display_name("/entry/instrument/detector"), "instrument/detector");
/// assert_eq!(display_name("/entry"), "entry");
/// ```
pub fn display_name(path: &str) -> &str {
    let trimmed = path.trim_start_matches('/');
    match trimmed.split_once('/') {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => trimmed,
    }
}

/// Returns true if the path lies below `/<entry>/<group>`.
///
/// # Example
///
/// ```rust
/// use nexus_tree::path::is_in_group;
///
/// assert!(is_in_group("/entry/process/fit/transformations/x", "process"));
/// assert!(!is_in_group("/entry/processing", "process"));
/// ```
pub fn is_in_group(path: &str, group: &str) -> bool {
    let mut segments = path.trim_start_matches('/').split('/');
    segments.next();
    segments.next() == Some(group)
}
