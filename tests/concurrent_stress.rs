//! Multi-threaded stress tests. N threads hammer a shared `Tree` with
//! randomized operations over a bounded path space; afterward the tree
//! must still be well-formed and every thread must have returned
//! (no deadlock, no panic).

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use foldertree::Tree;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 400;
const DIR_NAMES: &[&str] = &["a", "b", "c", "d"];

fn random_path(depth: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut path = String::from("/");
    for _ in 0..depth {
        path.push_str(DIR_NAMES[rng.gen_range(0..DIR_NAMES.len())]);
        path.push('/');
    }
    path
}

/// Walks the whole tree under read locks only, confirming every
/// reachable node is visited exactly once (no cycles) and collecting
/// the full set of live paths.
fn collect_live_paths(tree: &Tree, path: &str, out: &mut HashSet<String>) {
    let Ok(listing) = tree.list(path) else {
        return;
    };
    if listing.is_empty() {
        return;
    }
    for name in listing.split(',') {
        let child_path = format!("{path}{name}/");
        assert!(
            out.insert(child_path.clone()),
            "cycle or duplicate visit at {child_path}"
        );
        collect_live_paths(tree, &child_path, out);
    }
}

#[test]
fn concurrent_mixed_workload_never_deadlocks_or_corrupts() {
    // Surfaces the synchronizer's `tracing::trace!` wait/relay events
    // (see node.rs's acquire_read/acquire_write/acquire_move) on test
    // failure, without slowing down a passing run.
    let _ = tracing_subscriber::fmt()
        .with_env_filter("foldertree=trace")
        .with_test_writer()
        .try_init();

    let tree = Tree::new();
    let completed = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                let mut rng = rand::thread_rng();
                for _ in 0..OPS_PER_THREAD {
                    let depth = rng.gen_range(1..=3);
                    let path = random_path(depth);
                    match rng.gen_range(0..4) {
                        0 => {
                            let _ = tree.create(&path);
                        }
                        1 => {
                            let _ = tree.remove(&path);
                        }
                        2 => {
                            let _ = tree.list(&path);
                        }
                        _ => {
                            let other = random_path(rng.gen_range(1..=3));
                            let _ = tree.move_node(&path, &other);
                        }
                    }
                }
                completed.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    assert_eq!(
        completed.load(Ordering::SeqCst),
        THREADS,
        "a thread never returned"
    );

    // `move_node` can carry an existing subtree to a fresh depth-<=3
    // target, so nesting can grow past 3 over the run (a moved subtree's
    // own descendants ride along); there is no fixed node-count bound to
    // check here. Reaching this point without panicking already proves
    // the tree is well-formed: `collect_live_paths` would panic on a
    // cycle or a node visited twice.
    let mut live = HashSet::new();
    collect_live_paths(&tree, "/", &mut live);
}

#[test]
fn concurrent_moves_between_two_disjoint_subtrees_preserve_structure() {
    let tree = Tree::new();
    tree.create("/a/").unwrap();
    tree.create("/b/").unwrap();
    // Path components are lowercase letters only (no digits): derive a
    // distinct single-letter name per index instead of `n{i}`.
    let name_of = |i: u8| -> String { ((b'a' + i) as char).to_string() };
    for i in 0..20u8 {
        tree.create(&format!("/a/{}/", name_of(i))).unwrap();
    }

    std::thread::scope(|scope| {
        for i in 0..20u8 {
            let tree = &tree;
            scope.spawn(move || {
                let from = format!("/a/{}/", name_of(i));
                let to = format!("/b/{}/", name_of(i));
                tree.move_node(&from, &to).unwrap();
            });
        }
    });

    assert_eq!(tree.list("/a/").unwrap(), "");
    let b_listing = tree.list("/b/").unwrap();
    let mut names: Vec<&str> = b_listing.split(',').collect();
    names.sort_unstable();
    let mut expected: Vec<String> = (0..20u8).map(name_of).collect();
    expected.sort_unstable();
    assert_eq!(names, expected);
}

#[test]
fn rayon_concurrent_creates_under_shared_parent_all_succeed_exactly_once() {
    use rayon::prelude::*;

    let tree = Tree::new();
    tree.create("/shared/").unwrap();

    let name_of = |i: u8| -> String { ((b'a' + i) as char).to_string() };
    let results: Vec<bool> = (0..26u8)
        .into_par_iter()
        .map(|i| tree.create(&format!("/shared/{}/", name_of(i))).is_ok())
        .collect();

    assert!(results.into_iter().all(|ok| ok));
    let listing = tree.list("/shared/").unwrap();
    let mut names: Vec<&str> = listing.split(',').collect();
    names.sort_unstable();
    assert_eq!(names.len(), 26);
}

#[test]
fn rayon_concurrent_creates_of_same_path_succeed_exactly_once() {
    use rayon::prelude::*;
    use std::sync::atomic::AtomicU32;

    let tree = Tree::new();
    let success_count = AtomicU32::new(0);

    (0..100).into_par_iter().for_each(|_| {
        if tree.create("/contested/").is_ok() {
            success_count.fetch_add(1, Ordering::Relaxed);
        }
    });

    assert_eq!(success_count.load(Ordering::Relaxed), 1);
}
