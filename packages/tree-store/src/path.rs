//! Relative key paths.
//!
//! Keys are `/`-separated, case-sensitive and relative to the root folder.
//! All splitting and joining of keys goes through this module so that the
//! keys produced by traversal and the keys accepted by writes agree.

use crate::Error;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Names starting with this character are hidden.
pub const HIDDEN_MARKER: char = '.';

/// Split a key into its segments.
///
/// The key must be non-empty and contain no empty segments, so leading,
/// trailing and doubled separators are rejected rather than normalized.
///
/// ```rust
/// use drivefs_tree_store::path;
///
/// assert_eq!(path::segments("a/b/c.txt").unwrap(), vec!["a", "b", "c.txt"]);
/// assert!(path::segments("a//b").is_err());
/// ```
pub fn segments(key: &str) -> Result<Vec<&str>, Error> {
    if key.is_empty() {
        return Err(Error::invalid_input("empty path"));
    }

    let parts: Vec<&str> = key.split(SEPARATOR).collect();
    if let Some(position) = parts.iter().position(|p| p.is_empty()) {
        return Err(Error::invalid_input(format!(
            "empty segment at position {} in path '{}'",
            position, key
        )));
    }

    Ok(parts)
}

/// Split a key into its folder segments and its leaf name.
pub fn split_leaf(key: &str) -> Result<(Vec<&str>, &str), Error> {
    let mut parts = segments(key)?;
    // segments() never returns an empty vector
    let leaf = parts.pop().unwrap_or_default();
    Ok((parts, leaf))
}

/// Append `name` to `prefix`. An empty prefix denotes the root.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        let mut joined = String::with_capacity(prefix.len() + 1 + name.len());
        joined.push_str(prefix);
        joined.push(SEPARATOR);
        joined.push_str(name);
        joined
    }
}

/// Whether a node name is hidden.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}
