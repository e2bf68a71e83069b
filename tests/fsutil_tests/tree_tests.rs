//! Tests for the directory helpers
//!
//! These tests verify:
//! - Natural ordering of directory entries
//! - Recursive read / write of directory trees
//! - Clearing missing and populated directories
//! - Building trees from store mappings

use std::fs;

use serde_json::json;
use stashkv::fsutil::{
    check_entry_name, clear_dir, exists, is_dir, read_tree, write_tree, DirNode, DirTree,
};
use stashkv::{Mapping, StashError};
use tempfile::TempDir;

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_read_tree_natural_order() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["2", "10", "1"] {
        fs::write(temp_dir.path().join(name), name).unwrap();
    }

    let tree = read_tree(temp_dir.path()).unwrap();

    assert_eq!(tree.names(), vec!["1", "2", "10"]);
    assert_eq!(tree.get("10"), Some(&DirNode::File(b"10".to_vec())));
}

#[test]
fn test_read_tree_mixed_names() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["file10", "file2", "alpha", "file1"] {
        fs::write(temp_dir.path().join(name), b"").unwrap();
    }

    let tree = read_tree(temp_dir.path()).unwrap();

    assert_eq!(tree.names(), vec!["alpha", "file1", "file2", "file10"]);
}

#[test]
fn test_read_tree_recurses() {
    let temp_dir = TempDir::new().unwrap();
    let sub = temp_dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("inner.txt"), b"hi").unwrap();

    let tree = read_tree(temp_dir.path()).unwrap();

    match tree.get("sub") {
        Some(DirNode::Dir(child)) => {
            assert_eq!(child.get("inner.txt"), Some(&DirNode::File(b"hi".to_vec())));
        }
        other => panic!("expected directory, got {:?}", other),
    }
}

#[test]
fn test_read_tree_nested_natural_order() {
    let temp_dir = TempDir::new().unwrap();
    let sub = temp_dir.path().join("d");
    fs::create_dir(&sub).unwrap();
    for name in ["b10", "b9", "a"] {
        fs::write(sub.join(name), b"").unwrap();
    }
    fs::write(temp_dir.path().join("z"), b"").unwrap();

    let tree = read_tree(temp_dir.path()).unwrap();

    assert_eq!(tree.names(), vec!["d", "z"]);
    match tree.get("d") {
        Some(DirNode::Dir(child)) => assert_eq!(child.names(), vec!["a", "b9", "b10"]),
        other => panic!("expected directory, got {:?}", other),
    }
}

#[test]
fn test_read_tree_empty_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("outer").join("inner")).unwrap();

    let tree = read_tree(temp_dir.path()).unwrap();

    let mut inner = DirTree::new();
    inner.insert("inner", DirNode::Dir(DirTree::new()));
    assert_eq!(tree.get("outer"), Some(&DirNode::Dir(inner)));
}

#[cfg(target_os = "linux")]
#[test]
fn test_read_tree_rejects_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(OsStr::from_bytes(b"bad\xff")), b"x").unwrap();

    let result = read_tree(temp_dir.path());

    assert!(matches!(result, Err(StashError::InvalidEntryName(_))));
}

#[test]
fn test_read_tree_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    assert!(read_tree(&temp_dir.path().join("nope")).is_err());
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_write_tree_creates_directories() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out");

    let mut child = DirTree::new();
    child.insert("leaf", DirNode::File(b"leaf".to_vec()));
    let mut tree = DirTree::new();
    tree.insert("top", DirNode::File(b"top".to_vec()));
    tree.insert("dir", DirNode::Dir(child));

    write_tree(&target, &tree).unwrap();

    assert_eq!(fs::read(target.join("top")).unwrap(), b"top");
    assert_eq!(fs::read(target.join("dir").join("leaf")).unwrap(), b"leaf");
}

#[test]
fn test_write_then_read_tree() {
    let temp_dir = TempDir::new().unwrap();

    let mut tree = DirTree::new();
    tree.insert("1", DirNode::File(b"one".to_vec()));
    tree.insert("2", DirNode::File(b"two".to_vec()));
    tree.insert("10", DirNode::Dir(DirTree::new()));

    write_tree(temp_dir.path(), &tree).unwrap();

    assert_eq!(read_tree(temp_dir.path()).unwrap(), tree);
}

#[test]
fn test_insert_replaces() {
    let mut tree = DirTree::new();
    tree.insert("a", DirNode::File(b"1".to_vec()));
    tree.insert("a", DirNode::File(b"2".to_vec()));

    assert_eq!(tree.len(), 1);
    assert_eq!(tree.get("a"), Some(&DirNode::File(b"2".to_vec())));
}

// =============================================================================
// Entry Name Tests
// =============================================================================

#[test]
fn test_check_entry_name_accepts_plain_names() {
    for name in ["a", "file.txt", "..hidden", "with space", "x..y"] {
        assert!(check_entry_name(name).is_ok(), "{:?} should be accepted", name);
    }
}

#[test]
fn test_check_entry_name_rejects_escaping_names() {
    for name in ["", ".", "..", "a/b", "../outside.txt", "/etc/passwd", "dir/"] {
        assert!(
            matches!(check_entry_name(name), Err(StashError::InvalidEntryName(_))),
            "{:?} should be rejected",
            name
        );
    }
}

#[test]
fn test_write_tree_rejects_parent_reference() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out");

    let mut tree = DirTree::new();
    tree.insert("../outside.txt", DirNode::File(b"escaped".to_vec()));

    let result = write_tree(&target, &tree);

    assert!(matches!(result, Err(StashError::InvalidEntryName(_))));
    assert!(!temp_dir.path().join("outside.txt").exists());
}

#[test]
fn test_write_tree_rejects_absolute_name() {
    let temp_dir = TempDir::new().unwrap();
    let outside = temp_dir.path().join("outside.txt");

    let mut tree = DirTree::new();
    tree.insert(outside.to_str().unwrap(), DirNode::File(b"absolute".to_vec()));

    let result = write_tree(&temp_dir.path().join("out"), &tree);

    assert!(matches!(result, Err(StashError::InvalidEntryName(_))));
    assert!(!outside.exists());
}

#[test]
fn test_write_tree_rejects_empty_and_dot_names() {
    let temp_dir = TempDir::new().unwrap();

    for name in ["", ".", ".."] {
        let mut tree = DirTree::new();
        tree.insert(name, DirNode::File(b"x".to_vec()));
        let result = write_tree(&temp_dir.path().join("out"), &tree);
        assert!(matches!(result, Err(StashError::InvalidEntryName(_))));
    }
}

#[test]
fn test_write_tree_checks_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("out");

    let mut nested = DirTree::new();
    nested.insert("a/b", DirNode::File(b"x".to_vec()));
    let mut tree = DirTree::new();
    tree.insert("fine", DirNode::File(b"ok".to_vec()));
    tree.insert("dir", DirNode::Dir(nested));

    assert!(write_tree(&target, &tree).is_err());
    assert!(!target.exists());
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_clear_missing_directory_is_ok() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("never-created");

    assert!(clear_dir(&missing).is_ok());
}

#[test]
fn test_clear_directory() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("victim");
    fs::create_dir_all(target.join("deep")).unwrap();
    fs::write(target.join("deep").join("f"), b"x").unwrap();

    assert!(is_dir(&target));
    clear_dir(&target).unwrap();
    assert!(!exists(&target));
}

// =============================================================================
// Mapping Conversion Tests
// =============================================================================

#[test]
fn test_tree_from_mapping() {
    let mut mapping = Mapping::new();
    mapping.insert("text".to_string(), json!("hello"));
    mapping.insert("number".to_string(), json!(42));
    mapping.insert("obj".to_string(), json!({"inner": "x", "list": [1, 2]}));

    let tree = DirTree::from_mapping(&mapping);

    assert_eq!(tree.get("text"), Some(&DirNode::File(b"hello".to_vec())));
    assert_eq!(tree.get("number"), Some(&DirNode::File(b"42".to_vec())));
    match tree.get("obj") {
        Some(DirNode::Dir(child)) => {
            assert_eq!(child.get("inner"), Some(&DirNode::File(b"x".to_vec())));
            assert_eq!(child.get("list"), Some(&DirNode::File(b"[1,2]".to_vec())));
        }
        other => panic!("expected directory, got {:?}", other),
    }
}
