//! Error taxonomy for the folder tree.
//!
//! Every public operation returns `Result<_, TreeError>`. `TreeError::errno`
//! maps each variant to the POSIX-style integer code an embedding layer
//! (C ABI, CLI, ...) would expect; the crate itself never surfaces bare
//! integers internally.

use thiserror::Error;

/// Errors produced by tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Path failed grammar validation (syntax, name length, depth bound).
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The target of `create` (or `move_node`) already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A component on the path, or the target itself, does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// `remove` was called on a directory that still has children.
    #[error("not empty: {0}")]
    NotEmpty(String),

    /// The root was targeted by an operation that may not touch it directly.
    #[error("busy: {0}")]
    Busy(String),

    /// `move_node` target path is `source` itself or strictly inside it.
    #[error("move target `{target}` is inside source `{source_path}`")]
    TargetInsideSource { source_path: String, target: String },
}

impl TreeError {
    /// POSIX-style errno for callers that need the numeric form.
    ///
    /// `TargetInsideSource` has no POSIX analogue; the original system
    /// reserves `-1` for it, documented as distinct from every other code.
    pub fn errno(&self) -> i32 {
        match self {
            TreeError::InvalidPath(_) => 22,   // EINVAL
            TreeError::AlreadyExists(_) => 17, // EEXIST
            TreeError::NotFound(_) => 2,       // ENOENT
            TreeError::NotEmpty(_) => 39,      // ENOTEMPTY
            TreeError::Busy(_) => 16,          // EBUSY
            TreeError::TargetInsideSource { .. } => -1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
