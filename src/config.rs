//! Configuration surface for the path grammar.
//!
//! This crate never reads a file or an environment variable itself —
//! an embedding layer owns that and hands a [`TreeConfig`] to
//! [`crate::Tree::with_config`]. The `serde` derive exists purely so that
//! embedder can deserialize one from whatever config format it already
//! uses (TOML, JSON, ...).

use serde::{Deserialize, Serialize};

/// Default maximum length, in bytes, of a single path component.
///
/// Matches the bound used by the original system this crate's protocol
/// is modeled on.
pub const DEFAULT_MAX_FOLDER_NAME_LENGTH: usize = 255;

/// Bounds on the path grammar accepted by [`crate::path::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum number of bytes in a single path component.
    pub max_name_length: usize,
    /// Maximum number of components in a path, or `None` for unbounded.
    pub max_depth: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            max_name_length: DEFAULT_MAX_FOLDER_NAME_LENGTH,
            max_depth: None,
        }
    }
}
