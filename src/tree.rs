//! The four public tree operations: `list`, `create`, `remove`, and
//! `move_node`. Each validates its path arguments, walks the tree with
//! the locking discipline in [`crate::walk`], and returns a
//! [`crate::error::TreeError`] on any violated precondition.

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::node::{Node, NodeWriteGuard};
use crate::path::{self, ROOT};
use crate::walk;

/// An in-memory concurrent folder tree.
///
/// `Tree` owns a single root [`Node`]; every operation takes `&self`, so
/// the tree can be shared across threads behind an `Arc` (or a plain
/// reference, as in this crate's own tests) without an outer lock —
/// concurrency is entirely the per-node synchronizer's job.
pub struct Tree {
    root: Node,
    config: TreeConfig,
}

impl Tree {
    /// A new, empty tree using the default path grammar bounds.
    pub fn new() -> Self {
        Tree::with_config(TreeConfig::default())
    }

    /// A new, empty tree using caller-supplied path grammar bounds.
    pub fn with_config(config: TreeConfig) -> Self {
        Tree {
            root: Node::new(),
            config,
        }
    }

    fn validate(&self, path: &str) -> Result<()> {
        if path::validate(path, &self.config) {
            Ok(())
        } else {
            Err(TreeError::InvalidPath(path.to_string()))
        }
    }

    /// Lists `path`'s immediate children as a single comma-separated
    /// string. Child order within the string is unspecified; callers
    /// must not rely on it.
    pub fn list(&self, path: &str) -> Result<String> {
        self.validate(path)?;
        let guard = walk::descend_to_read(&self.root, path)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;
        let mut names: Vec<&str> = guard.keys().map(String::as_str).collect();
        names.sort_unstable();
        let listing = names.join(",");
        tracing::debug!(target: "foldertree::tree", path, count = names.len(), "list");
        Ok(listing)
    }

    /// Creates an empty directory at `path`. The parent must already
    /// exist; `path` itself must not.
    pub fn create(&self, path: &str) -> Result<()> {
        self.validate(path)?;
        let (parent_path, name) = path::parent_and_name(path).ok_or_else(|| {
            tracing::warn!(target: "foldertree::tree", path, "create: target is root");
            TreeError::AlreadyExists(path.to_string())
        })?;

        let mut parent = walk::descend_to_modify(&self.root, &parent_path, false)
            .ok_or_else(|| TreeError::NotFound(parent_path.clone()))?;
        if parent.contains_key(&name) {
            tracing::warn!(target: "foldertree::tree", path, "create: already exists");
            return Err(TreeError::AlreadyExists(path.to_string()));
        }
        parent.insert(name, Box::new(Node::new()));
        tracing::debug!(target: "foldertree::tree", path, "create: ok");
        Ok(())
    }

    /// Removes the empty directory at `path`.
    pub fn remove(&self, path: &str) -> Result<()> {
        self.validate(path)?;
        if path == ROOT {
            tracing::warn!(target: "foldertree::tree", "remove: refused on root");
            return Err(TreeError::Busy(path.to_string()));
        }
        let (parent_path, name) = path::parent_and_name(path).expect("checked above: path != ROOT");

        let mut parent = walk::descend_to_modify(&self.root, &parent_path, false)
            .ok_or_else(|| TreeError::NotFound(parent_path.clone()))?;
        let target = parent
            .get(&name)
            .ok_or_else(|| TreeError::NotFound(path.to_string()))?;
        // SAFETY: `target` is reached through `parent`'s write lock, so
        // no concurrent writer can be mutating its child map right now.
        if !unsafe { target.children_unchecked() }.is_empty() {
            tracing::warn!(target: "foldertree::tree", path, "remove: not empty");
            return Err(TreeError::NotEmpty(path.to_string()));
        }
        // Drains (trivially, since it has no children) and confirms no
        // other thread is mid-operation inside it before we unlink it.
        target.drain_subtree();
        parent.remove(&name);
        tracing::debug!(target: "foldertree::tree", path, "remove: ok");
        Ok(())
    }

    /// Moves the directory at `source` to `target`, renaming it along
    /// the way if `target`'s leaf name differs from `source`'s.
    ///
    /// `target` must not already exist, and must not be `source` itself
    /// or a descendant of it. Both `source` and `target`'s parents must
    /// exist.
    pub fn move_node(&self, source: &str, target: &str) -> Result<()> {
        self.validate(source)?;
        self.validate(target)?;

        if source == ROOT {
            tracing::warn!(target: "foldertree::tree", source, "move: refused on root source");
            return Err(TreeError::Busy(source.to_string()));
        }
        if path::is_target_inside_source(source, target) {
            tracing::warn!(target: "foldertree::tree", source, target, "move: target inside source");
            return Err(TreeError::TargetInsideSource {
                source_path: source.to_string(),
                target: target.to_string(),
            });
        }
        let (target_parent_path, target_name) = path::parent_and_name(target).ok_or_else(|| {
            tracing::warn!(target: "foldertree::tree", target, "move: target is root");
            TreeError::AlreadyExists(target.to_string())
        })?;
        let (source_parent_path, source_name) =
            path::parent_and_name(source).expect("checked above: source != ROOT");

        // Defensive: `is_target_inside_source` already rejects every case
        // where `source` could equal the LCA, but the invariant is cheap
        // enough to assert directly rather than relying on that proof.
        let lca_path = path::longest_common_ancestor(source, target);
        if source == lca_path {
            tracing::warn!(target: "foldertree::tree", source, "move: source reduces to lca");
            return Err(TreeError::Busy(source.to_string()));
        }

        let mut lca: Option<NodeWriteGuard> = Some(
            walk::descend_to_modify(&self.root, &lca_path, false)
                .ok_or_else(|| TreeError::NotFound(lca_path.clone()))?,
        );
        // Stable regardless of whether `lca` itself is later dropped:
        // `NodeWriteGuard::node()` returns a reference borrowed from the
        // tree's root, not from the guard.
        let lca_node = lca.as_ref().expect("just assigned").node();

        // `target` itself can be the LCA (e.g. moving `/a/b/` onto `/a/`,
        // an ancestor of `source`) — then `target_parent_path` is one
        // level *shallower* than `lca_path`, not a descendant of it, and
        // `target` already exists as the LCA node we're holding.
        if target == lca_path {
            tracing::warn!(target: "foldertree::tree", target, "move: target is the lca itself");
            return Err(TreeError::AlreadyExists(target.to_string()));
        }

        // Resolve the target's parent relative to the LCA. An empty
        // suffix means the target's parent *is* the LCA; reuse `lca`
        // rather than acquiring a second write lock on the same node
        // (which would deadlock against ourselves).
        let target_suffix = path::strip_ancestor(&target_parent_path, &lca_path);
        let mut target_owned: Option<NodeWriteGuard> = None;
        if !target_suffix.is_empty() {
            match walk::descend_to_modify(lca_node, &path::to_path(&target_suffix), true) {
                Some(guard) => target_owned = Some(guard),
                None => return Err(TreeError::NotFound(target_parent_path)),
            }
        }

        {
            let target_children = match &target_owned {
                Some(guard) => &**guard,
                None => &**lca.as_ref().expect("lca not yet released"),
            };
            if target_children.contains_key(&target_name) {
                tracing::warn!(target: "foldertree::tree", target, "move: target already exists");
                return Err(TreeError::AlreadyExists(target.to_string()));
            }
        }

        // Resolve the source's parent the same way. By construction
        // (proved in the module doc above) this is never the same node
        // as `target_owned` unless both reduce to the LCA, in which case
        // they're already the same `lca` borrow used sequentially below.
        let source_suffix = path::strip_ancestor(&source_parent_path, &lca_path);
        let mut source_owned: Option<NodeWriteGuard> = None;
        if !source_suffix.is_empty() {
            match walk::descend_to_modify(lca_node, &path::to_path(&source_suffix), true) {
                Some(guard) => source_owned = Some(guard),
                None => return Err(TreeError::NotFound(source_parent_path)),
            }
        }

        // Per SPEC_FULL.md §4.3 step 5: release the LCA write lock once
        // both parents are resolved, unless it is identical to either
        // one. If both `target_owned` and `source_owned` are `Some`, the
        // LCA is neither parent, and holding it any longer would only
        // serialize unrelated concurrent operations under the LCA's
        // subtree for the rest of the move.
        if target_owned.is_some() && source_owned.is_some() {
            lca = None;
        }

        // `target_ptr`/`source_ptr` only ever alias when both resolved to
        // `lca` (the sibling-rename case); the two statements that use
        // them below never run concurrently, so that aliasing is benign.
        let target_ptr: *mut crate::node::Children = match &mut target_owned {
            Some(guard) => &mut **guard,
            None => &mut **lca.as_mut().expect("lca covers the unresolved parent"),
        };
        let source_ptr: *mut crate::node::Children = match &mut source_owned {
            Some(guard) => &mut **guard,
            None => &mut **lca.as_mut().expect("lca covers the unresolved parent"),
        };

        // SAFETY: `source_ptr` is write-locked by `source_owned` or by
        // `lca`, both held for the duration of this block.
        let moved = unsafe { (*source_ptr).get(&source_name) }
            .ok_or_else(|| TreeError::NotFound(source.to_string()))?;
        moved.drain_subtree();
        // SAFETY: see above; `remove` on an `AHashMap` does not move any
        // other entry, so this is sound even when `target_ptr == source_ptr`.
        let moved = unsafe { (*source_ptr).remove(&source_name) }.expect("just confirmed present");
        // SAFETY: see above.
        unsafe { (*target_ptr).insert(target_name, moved) };

        tracing::debug!(target: "foldertree::tree", source, target, "move: ok");
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}
