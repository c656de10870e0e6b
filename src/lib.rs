//! An in-memory concurrent folder tree.
//!
//! Each directory is a [`node::Node`] with its own readers/writers/mover
//! synchronizer — there is no tree-wide lock. [`walk`] implements the
//! hand-over-hand descent that every operation in [`tree::Tree`] is
//! built on: `list`/`create`/`remove` read- or write-lock one path at a
//! time, and `move_node` additionally locks the two paths' longest
//! common ancestor so that a concurrent move can never deadlock against
//! a concurrent read or write anywhere else in the tree.
//!
//! # Modules
//! - [`config`] — the path grammar's configurable bounds.
//! - [`error`] — the `TreeError` taxonomy and its POSIX errno mapping.
//! - [`path`] — pure path validation and decomposition helpers.
//! - [`node`] — the per-node synchronizer.
//! - [`walk`] — hand-over-hand path descent built on `node`.
//! - [`tree`] — the public `Tree` type and its four operations.

pub mod config;
pub mod error;
pub mod node;
pub mod path;
pub mod tree;
pub mod walk;

pub use config::TreeConfig;
pub use error::{Result, TreeError};
pub use tree::Tree;
