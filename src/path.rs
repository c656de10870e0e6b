//! Path syntax: validation, component iteration, and the two derived
//! paths the tree operations need — a path's parent, and the longest
//! common ancestor of two paths.
//!
//! A valid path is `"/"` or `"/c1/c2/.../ck/"`, where each `ci` is
//! `1..=max_name_length` lowercase ASCII letters. Every valid path ends
//! with `/`. These are pure functions: nothing here touches a `Node` or
//! takes a lock.

use crate::config::TreeConfig;
use once_cell_component_re::component_regex;

mod once_cell_component_re {
    use regex::Regex;
    use std::sync::OnceLock;

    static COMPONENT_RE: OnceLock<Regex> = OnceLock::new();

    /// A bare component matcher (`^[a-z]+$`); the length bound is checked
    /// separately since it is configurable and a `Regex` can't easily be
    /// rebuilt per-call without extra allocation.
    pub fn component_regex() -> &'static Regex {
        COMPONENT_RE.get_or_init(|| Regex::new(r"^[a-z]+$").expect("static pattern"))
    }
}

/// Root path representation.
pub const ROOT: &str = "/";

/// Splits `path` into its non-empty components, in order.
///
/// `components("/a/b/")` yields `["a", "b"]`. `components("/")` yields
/// nothing.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Validates `path` against the grammar bounded by `config`.
pub fn validate(path: &str, config: &TreeConfig) -> bool {
    if path.is_empty() || !path.starts_with('/') || !path.ends_with('/') {
        return false;
    }
    if path == ROOT {
        return true;
    }

    let re = component_regex();
    let mut depth = 0usize;
    // Split the interior (without the leading/trailing `/`) keeping empty
    // segments, so a doubled slash surfaces as an empty component instead
    // of silently vanishing the way `components()`'s filter would.
    for component in path[1..path.len() - 1].split('/') {
        if component.is_empty() || component.len() > config.max_name_length {
            return false;
        }
        if !re.is_match(component) {
            return false;
        }
        depth += 1;
    }
    if let Some(max_depth) = config.max_depth {
        if depth > max_depth {
            return false;
        }
    }
    true
}

/// Splits `path` into `(parent_path, leaf_name)`. Returns `None` for the
/// root, which has no parent.
pub fn parent_and_name(path: &str) -> Option<(String, String)> {
    if path == ROOT {
        return None;
    }
    let mut parts: Vec<&str> = components(path).collect();
    let name = parts
        .pop()
        .expect("non-root path has at least one component");
    let parent = to_path(&parts);
    Some((parent, name.to_string()))
}

/// Joins path components back into a `"/c1/c2/.../"` string (or `"/"`
/// for an empty component list).
pub fn to_path(components: &[&str]) -> String {
    if components.is_empty() {
        return ROOT.to_string();
    }
    let mut path = String::with_capacity(components.iter().map(|c| c.len() + 1).sum::<usize>() + 1);
    for component in components {
        path.push('/');
        path.push_str(component);
    }
    path.push('/');
    path
}

/// The longest common ancestor directory of two (already-valid) paths —
/// the deepest directory that is a prefix of both.
pub fn longest_common_ancestor(a: &str, b: &str) -> String {
    let a_parts: Vec<&str> = components(a).collect();
    let b_parts: Vec<&str> = components(b).collect();
    let common: Vec<&str> = a_parts
        .iter()
        .zip(b_parts.iter())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| *x)
        .collect();
    to_path(&common)
}

/// The path relative to `ancestor`, i.e. the components of `path` with
/// `ancestor`'s leading components stripped.
///
/// Panics if `ancestor` is not actually a prefix of `path` (callers only
/// use this once they've established that relationship).
pub fn strip_ancestor<'a>(path: &'a str, ancestor: &str) -> Vec<&'a str> {
    let ancestor_parts: Vec<&str> = components(ancestor).collect();
    let path_parts: Vec<&str> = components(path).collect();
    assert!(
        path_parts.len() >= ancestor_parts.len()
            && path_parts[..ancestor_parts.len()] == ancestor_parts[..],
        "`{ancestor}` is not an ancestor of `{path}`"
    );
    path_parts[ancestor_parts.len()..].to_vec()
}

/// True if `target` is `source` itself, or strictly inside it — a
/// component-wise prefix match, not a lexicographic string comparison.
///
/// `move_node` rejects both cases: moving a subtree into itself, or into
/// one of its own descendants, is ill-defined.
pub fn is_target_inside_source(source: &str, target: &str) -> bool {
    let source_parts: Vec<&str> = components(source).collect();
    let target_parts: Vec<&str> = components(target).collect();
    target_parts.len() >= source_parts.len()
        && target_parts[..source_parts.len()] == source_parts[..]
}
