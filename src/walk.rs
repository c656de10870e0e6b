//! Hand-over-hand path descent.
//!
//! Both walks start by taking a lock on the current node, look up the
//! next component in its child map, acquire the appropriate lock on the
//! child, and only then release the parent's lock — the child is never
//! reachable through an unlocked node, and the parent is never held a
//! moment longer than necessary. A child `Node` lives in a `Box` owned by
//! its parent's map, so its address is stable for as long as any lock
//! anywhere on its ancestor chain is held; that is what makes it sound to
//! keep using a child reference after its parent's guard has been
//! dropped.

use crate::node::{Children, Node, NodeReadGuard, NodeWriteGuard};
use crate::path::components;

/// Read-locks `root`, walks `path` component by component (each hop
/// read-locked in turn, releasing the previous hop once the next is
/// held), and returns the terminal node still read-locked.
///
/// Returns `None` if any component along the way is missing.
pub fn descend_to_read<'a>(root: &'a Node, path: &str) -> Option<NodeReadGuard<'a>> {
    let mut guard = root.acquire_read();
    for component in components(path) {
        let next_ptr: *const Node = match guard.get(component) {
            Some(child) => &**child as *const Node,
            None => return None,
        };
        // SAFETY: `next` is owned by a `Box` inside `guard`'s children
        // map; it outlives `guard` because nothing can remove it from
        // its parent while we hold (and are about to re-hold, on it
        // directly) a lock somewhere along the chain down to it.
        let next: &'a Node = unsafe { &*next_ptr };
        let next_guard = next.acquire_read();
        drop(guard);
        guard = next_guard;
    }
    Some(guard)
}

/// Walks `path` (relative to `start`) acquiring read locks on every
/// intermediate component and a write lock on the terminal one.
///
/// If `already_locked` is `true`, the caller already holds a write lock
/// on `start` itself (e.g. it is the LCA node acquired by a prior call)
/// and this function must not lock or unlock it — only the first hop's
/// release is skipped; every hop after that follows the normal
/// lock-coupling discipline. If `already_locked` is `false`, `start` is
/// read-locked here before the walk begins.
///
/// `path` must be non-empty when `already_locked` is `true`: the only
/// caller that passes `already_locked = true` (`Tree::move_node`)
/// resolves the "target/source parent is exactly the already-locked
/// node" case itself, since reusing that lock requires reusing the
/// caller's own guard rather than acquiring a fresh one here.
///
/// Returns `None` if any component along the way is missing.
pub fn descend_to_modify<'a>(
    start: &'a Node,
    path: &str,
    already_locked: bool,
) -> Option<NodeWriteGuard<'a>> {
    let parts: Vec<&str> = components(path).collect();
    if parts.is_empty() {
        debug_assert!(
            !already_locked,
            "already_locked with an empty path has no caller in this crate"
        );
        return Some(start.acquire_write());
    }

    // `pending_read` holds the lock we took on the *previous* hop, so we
    // can release it once the next hop's lock is in hand. It is `None`
    // on the very first iteration when `already_locked` is true, since
    // then the previous hop's lock belongs to the caller.
    let mut pending_read: Option<NodeReadGuard<'a>> = None;
    let mut current_children: *const Children = if already_locked {
        // SAFETY: caller guarantees a write lock is held on `start`.
        unsafe { start.children_unchecked() as *const Children }
    } else {
        let guard = start.acquire_read();
        let ptr = &*guard as *const Children;
        pending_read = Some(guard);
        ptr
    };
    let mut first_hop_is_foreign = already_locked;

    for (index, component) in parts.iter().enumerate() {
        let is_last = index == parts.len() - 1;
        // SAFETY: see the module doc — the referenced children map is
        // still locked by either `pending_read` or the caller's guard.
        let children_ref: &Children = unsafe { &*current_children };
        let next_ptr: *const Node = match children_ref.get(*component) {
            Some(child) => &**child as *const Node,
            None => return None,
        };
        let next: &'a Node = unsafe { &*next_ptr };

        if is_last {
            let write_guard = next.acquire_write();
            if !first_hop_is_foreign {
                drop(pending_read.take());
            }
            return Some(write_guard);
        }

        let next_guard = next.acquire_read();
        if !first_hop_is_foreign {
            drop(pending_read.take());
        }
        first_hop_is_foreign = false;
        current_children = &*next_guard as *const Children;
        pending_read = Some(next_guard);
    }
    unreachable!("loop above always returns on its last iteration")
}
