//! End-to-end scenarios against the public `Tree` API, one per
//! documented walkthrough of the four operations.

use foldertree::{Tree, TreeError};

#[test]
fn scenario_create_and_list() {
    let tree = Tree::new();
    assert_eq!(tree.create("/a/"), Ok(()));
    assert_eq!(tree.list("/").unwrap(), "a");
    assert_eq!(tree.list("/a/").unwrap(), "");
}

#[test]
fn scenario_duplicate_create() {
    let tree = Tree::new();
    assert_eq!(tree.create("/a/"), Ok(()));
    assert_eq!(
        tree.create("/a/"),
        Err(TreeError::AlreadyExists("/a/".to_string()))
    );
}

#[test]
fn scenario_create_missing_parent() {
    let tree = Tree::new();
    assert_eq!(
        tree.create("/a/b/"),
        Err(TreeError::NotFound("/a/".to_string()))
    );
}

#[test]
fn scenario_remove_nonempty_then_empty() {
    let tree = Tree::new();
    assert_eq!(tree.create("/a/"), Ok(()));
    assert_eq!(tree.create("/a/b/"), Ok(()));
    assert_eq!(
        tree.remove("/a/"),
        Err(TreeError::NotEmpty("/a/".to_string()))
    );
    assert_eq!(tree.remove("/a/b/"), Ok(()));
    assert_eq!(tree.remove("/a/"), Ok(()));
}

#[test]
fn scenario_root_is_immovable_and_unremovable() {
    let tree = Tree::new();
    assert_eq!(tree.remove("/"), Err(TreeError::Busy("/".to_string())));
    assert_eq!(
        tree.move_node("/", "/x/"),
        Err(TreeError::Busy("/".to_string()))
    );
}

#[test]
fn scenario_move_across_subtrees_with_rename() {
    let tree = Tree::new();
    assert_eq!(tree.create("/a/"), Ok(()));
    assert_eq!(tree.create("/b/"), Ok(()));
    assert_eq!(tree.create("/a/x/"), Ok(()));
    assert_eq!(tree.move_node("/a/x/", "/b/y/"), Ok(()));
    assert_eq!(tree.list("/a/").unwrap(), "");
    assert_eq!(tree.list("/b/").unwrap(), "y");
}

#[test]
fn scenario_move_into_own_subtree_is_rejected() {
    let tree = Tree::new();
    assert_eq!(tree.create("/a/"), Ok(()));
    assert_eq!(tree.create("/a/b/"), Ok(()));
    assert_eq!(
        tree.move_node("/a/", "/a/b/c/"),
        Err(TreeError::TargetInsideSource {
            source_path: "/a/".to_string(),
            target: "/a/b/c/".to_string(),
        })
    );
}

#[test]
fn scenario_errno_mapping_is_posix() {
    assert_eq!(TreeError::InvalidPath(String::new()).errno(), 22);
    assert_eq!(TreeError::AlreadyExists(String::new()).errno(), 17);
    assert_eq!(TreeError::NotFound(String::new()).errno(), 2);
    assert_eq!(TreeError::NotEmpty(String::new()).errno(), 39);
    assert_eq!(TreeError::Busy(String::new()).errno(), 16);
    assert_eq!(
        TreeError::TargetInsideSource {
            source_path: String::new(),
            target: String::new()
        }
        .errno(),
        -1
    );
}
