//! Tests for BackingFile
//!
//! These tests verify:
//! - Path derivation from directory and name
//! - Missing files read as absent
//! - Write/read through the zstd codec
//! - Corrupt content surfaces as an error

use std::path::Path;

use serde_json::json;
use stashkv::storage::{decode_mapping, BackingFile};
use stashkv::{Mapping, StashError};
use tempfile::TempDir;

// =============================================================================
// Path Tests
// =============================================================================

#[test]
fn test_path_for_hex_encodes_name() {
    let path = BackingFile::path_for(Path::new("/data"), "ab");
    assert_eq!(path, Path::new("/data/$6162.zst"));
}

#[test]
fn test_path_for_utf8_name() {
    let path = BackingFile::path_for(Path::new("dir"), "é");
    assert_eq!(path, Path::new("dir/$c3a9.zst"));
}

#[test]
fn test_path_is_stable() {
    let a = BackingFile::new(Path::new("dir"), "same", 3);
    let b = BackingFile::new(Path::new("dir"), "same", 19);
    assert_eq!(a.path(), b.path());
}

// =============================================================================
// Read / Write Tests
// =============================================================================

#[test]
fn test_read_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "missing", 3);

    assert!(!file.exists());
    assert!(file.read().unwrap().is_none());
    assert!(file.read_or_empty().unwrap().is_empty());
}

#[test]
fn test_write_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("a").join("b");
    let file = BackingFile::new(&dir, "nested", 3);

    file.write(&Mapping::new()).unwrap();

    assert!(dir.is_dir());
    assert!(file.exists());
}

#[test]
fn test_write_then_read() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "data", 3);

    let mut mapping = Mapping::new();
    mapping.insert("list".to_string(), json!([1, 2, 3]));
    mapping.insert("nested".to_string(), json!({"deep": {"deeper": null}}));

    let bytes = file.write(&mapping).unwrap();

    assert_eq!(bytes, std::fs::metadata(file.path()).unwrap().len());
    assert_eq!(file.read().unwrap(), Some(mapping));
}

#[test]
fn test_repetitive_content_compresses() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "big", 3);

    let mut mapping = Mapping::new();
    mapping.insert("a".to_string(), json!("z".repeat(100_000)));

    let bytes = file.write(&mapping).unwrap();

    assert!(bytes < 10_000);
}

#[test]
fn test_write_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "data", 3);

    let mut first = Mapping::new();
    first.insert("a".to_string(), json!(1));
    file.write(&first).unwrap();

    let mut second = Mapping::new();
    second.insert("b".to_string(), json!(2));
    file.write(&second).unwrap();

    assert_eq!(file.read().unwrap(), Some(second));
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_read_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "bad", 3);
    std::fs::write(file.path(), b"\x00\x01\x02").unwrap();

    assert!(matches!(file.read(), Err(StashError::Decompression(_))));
}

#[test]
fn test_read_truncated_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = BackingFile::new(temp_dir.path(), "short", 3);

    let mut mapping = Mapping::new();
    mapping.insert("a".to_string(), json!("value".repeat(100)));
    file.write(&mapping).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    std::fs::write(file.path(), &bytes[..bytes.len() / 2]).unwrap();

    assert!(file.read().is_err());
}

#[test]
fn test_decode_invalid_json() {
    let compressed = zstd::encode_all(&b"{not json"[..], 3).unwrap();
    assert!(matches!(
        decode_mapping(&compressed),
        Err(StashError::Serialization(_))
    ));
}
