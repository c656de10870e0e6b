//! The per-node synchronizer: a hand-rolled readers/writers/mover lock.
//!
//! Each [`Node`] owns its own mutex, relay token, and three condition
//! variables — there is no tree-wide lock. `read`/`write` acquire
//! return RAII guards exactly like a conventional rwlock; `move` access
//! has no guard, because a node that has fully drained is — by the time
//! any caller reaches this point — unreachable from every other thread
//! (see [`crate::walk`] and [`crate::tree`]).

use ahash::AHashMap;
use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// Sentinel `change` value meaning "a writer has been handed the
/// baton and is entitled to enter next".
const WRITE_TOKEN: i64 = -1;

/// The map of a node's immediate children, keyed by component name.
pub type Children = AHashMap<String, Box<Node>>;

/// Counters and relay token protected by a node's mutex.
struct SyncState {
    readers_active: i64,
    writers_active: i64,
    readers_waiting: i64,
    writers_waiting: i64,
    /// `0` = no baton in flight, `WRITE_TOKEN` = a writer owns it,
    /// `k > 0` = `k` readers collectively own it.
    change: i64,
}

impl SyncState {
    fn new() -> Self {
        SyncState {
            readers_active: 0,
            writers_active: 0,
            readers_waiting: 0,
            writers_waiting: 0,
            change: 0,
        }
    }
}

/// A directory entry: its children and the synchronizer guarding them.
pub struct Node {
    children: UnsafeCell<Children>,
    state: Mutex<SyncState>,
    cv_read: Condvar,
    cv_write: Condvar,
    cv_move: Condvar,
}

// SAFETY: `children` is only ever read through a `NodeReadGuard` (taken
// while in read mode) or written through a `NodeWriteGuard` (taken while
// in write mode); the synchronizer enforces the usual rwlock exclusion
// before handing either guard out, exactly as `state` does for the
// counters it protects.
unsafe impl Send for Node {}
unsafe impl Sync for Node {}

impl Node {
    pub fn new() -> Self {
        Node {
            children: UnsafeCell::new(AHashMap::default()),
            state: Mutex::new(SyncState::new()),
            cv_read: Condvar::new(),
            cv_write: Condvar::new(),
            cv_move: Condvar::new(),
        }
    }

    /// Acquire read access: blocks other writers, never other readers.
    pub fn acquire_read(&self) -> NodeReadGuard<'_> {
        let mut state = self.state.lock();
        state.readers_waiting += 1;
        while state.writers_active + state.writers_waiting > 0 && state.change <= 0 {
            tracing::trace!(target: "foldertree::node", "reader waiting for cv_read");
            self.cv_read.wait(&mut state);
        }
        state.readers_waiting -= 1;
        if state.change > 0 {
            state.change -= 1;
        }
        state.readers_active += 1;
        if state.change > 0 {
            // Relay the baton to the next waiting reader in the batch.
            self.cv_read.notify_one();
        }
        drop(state);
        NodeReadGuard { node: self }
    }

    fn release_read(&self) {
        let mut state = self.state.lock();
        state.readers_active -= 1;
        if state.readers_active == 0 && state.writers_waiting > 0 {
            state.change = WRITE_TOKEN;
            self.cv_write.notify_one();
        } else if state.readers_active == 0 && state.writers_waiting == 0 {
            // No one left to prefer; wake a parked mover, if any.
            self.cv_move.notify_one();
        }
    }

    /// Acquire write access: exclusive of both readers and writers.
    pub fn acquire_write(&self) -> NodeWriteGuard<'_> {
        let mut state = self.state.lock();
        state.writers_waiting += 1;
        while state.writers_active + state.readers_active > 0 && state.change != WRITE_TOKEN {
            tracing::trace!(target: "foldertree::node", "writer waiting for cv_write");
            self.cv_write.wait(&mut state);
        }
        state.writers_waiting -= 1;
        state.change = 0;
        state.writers_active += 1;
        drop(state);
        NodeWriteGuard { node: self }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        state.writers_active -= 1;
        // Prefer readers, then writers, then the mover.
        if state.readers_waiting > 0 {
            state.change = state.readers_waiting;
            self.cv_read.notify_one();
        } else if state.writers_waiting > 0 {
            state.change = WRITE_TOKEN;
            self.cv_write.notify_one();
        } else {
            self.cv_move.notify_one();
        }
    }

    /// Acquire move access: waits until the node has no readers or
    /// writers, active or waiting, then returns with the node drained.
    ///
    /// There is no guard and no `release_move` — by the time a caller
    /// can observe the drained node, it has already been detached from
    /// (or is about to be detached from) every parent any other thread
    /// could use to reach it, so nothing is left to signal on exit.
    pub fn acquire_move(&self) {
        let mut state = self.state.lock();
        while state.readers_active
            + state.readers_waiting
            + state.writers_active
            + state.writers_waiting
            > 0
        {
            tracing::trace!(target: "foldertree::node", "mover waiting for cv_move");
            self.cv_move.wait(&mut state);
        }
        state.change = 0;
    }

    /// Drains `self` and then recursively every descendant.
    ///
    /// Safe to call once `self` is unreachable from any thread other
    /// than the caller (i.e. its former parent's write lock is held, or
    /// it has already been unlinked).
    pub fn drain_subtree(&self) {
        self.acquire_move();
        // SAFETY: drained and unreachable — see `acquire_move`'s doc.
        let children = unsafe { &*self.children.get() };
        for child in children.values() {
            child.drain_subtree();
        }
    }

    /// Returns the child map without going through the synchronizer.
    ///
    /// # Safety
    /// The caller must already hold a read or write lock on `self`
    /// acquired some other way (e.g. a [`NodeWriteGuard`] it owns on this
    /// same node), so no concurrent mutation can race this access.
    pub unsafe fn children_unchecked(&self) -> &Children {
        &*self.children.get()
    }

    #[cfg(test)]
    fn snapshot(&self) -> (i64, i64, i64, i64, i64) {
        let state = self.state.lock();
        (
            state.readers_active,
            state.writers_active,
            state.readers_waiting,
            state.writers_waiting,
            state.change,
        )
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::new()
    }
}

/// RAII read-mode guard; derefs to the node's child map.
pub struct NodeReadGuard<'a> {
    node: &'a Node,
}

impl<'a> Deref for NodeReadGuard<'a> {
    type Target = Children;
    fn deref(&self) -> &Children {
        // SAFETY: holding a NodeReadGuard means the synchronizer counted
        // us as an active reader; writers and the mover cannot run.
        unsafe { &*self.node.children.get() }
    }
}

impl<'a> Drop for NodeReadGuard<'a> {
    fn drop(&mut self) {
        self.node.release_read();
    }
}

impl<'a> NodeReadGuard<'a> {
    /// The node this guard locks, for callers that need to hand it to
    /// another acquisition (e.g. the next hop of a path walk).
    pub fn node(&self) -> &'a Node {
        self.node
    }
}

/// RAII write-mode guard; derefs mutably to the node's child map.
pub struct NodeWriteGuard<'a> {
    node: &'a Node,
}

impl<'a> Deref for NodeWriteGuard<'a> {
    type Target = Children;
    fn deref(&self) -> &Children {
        unsafe { &*self.node.children.get() }
    }
}

impl<'a> DerefMut for NodeWriteGuard<'a> {
    fn deref_mut(&mut self) -> &mut Children {
        // SAFETY: holding a NodeWriteGuard means we are the sole active
        // accessor of this node (no readers, no other writer, no mover).
        unsafe { &mut *self.node.children.get() }
    }
}

impl<'a> Drop for NodeWriteGuard<'a> {
    fn drop(&mut self) {
        self.node.release_write();
    }
}

impl<'a> NodeWriteGuard<'a> {
    /// The node this guard locks, for callers that need to hand it to
    /// another acquisition (e.g. resolving a sibling path from the same
    /// already-locked ancestor during `move_node`).
    pub fn node(&self) -> &'a Node {
        self.node
    }
}
