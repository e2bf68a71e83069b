//! Directory trees
//!
//! In-memory mirror of a directory: nested directories and file contents.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use serde_json::Value;
use walkdir::WalkDir;

use crate::buffer::Mapping;
use crate::error::{Result, StashError};

use super::natural_cmp;

/// A node of a directory tree
#[derive(Debug, Clone, PartialEq)]
pub enum DirNode {
    /// A sub-directory
    Dir(DirTree),

    /// A regular file and its contents
    File(Vec<u8>),
}

/// Named entries of one directory, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirTree {
    entries: Vec<(String, DirNode)>,
}

impl DirTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, node: DirNode) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = node,
            None => self.entries.push((name, node)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DirNode> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, node)| node)
    }

    /// Entry names in order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a tree from a store mapping
    ///
    /// Objects become sub-directories, strings become file contents,
    /// every other value is written as its JSON text.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        let mut tree = Self::new();
        for (key, value) in mapping {
            tree.insert(key.clone(), node_from_value(value));
        }
        tree
    }
}

fn node_from_value(value: &Value) -> DirNode {
    match value {
        Value::Object(map) => {
            let mut tree = DirTree::new();
            for (key, child) in map {
                tree.insert(key.clone(), node_from_value(child));
            }
            DirNode::Dir(tree)
        }
        Value::String(text) => DirNode::File(text.as_bytes().to_vec()),
        other => DirNode::File(other.to_string().into_bytes()),
    }
}

/// Read a directory recursively, entries sorted in natural order
///
/// Names that are not valid UTF-8 are rejected rather than renamed.
pub fn read_tree(path: &Path) -> Result<DirTree> {
    let walker = WalkDir::new(path).min_depth(1).sort_by(|a, b| {
        natural_cmp(&a.file_name().to_string_lossy(), &b.file_name().to_string_lossy())
    });

    // Open directories from the root down; an entry at depth d lands in stack[d - 1]
    let mut stack: Vec<(String, DirTree)> = vec![(String::new(), DirTree::new())];

    for entry in walker {
        let entry = entry?;

        while stack.len() > entry.depth() {
            close_dir(&mut stack);
        }

        let name = entry
            .file_name()
            .to_str()
            .ok_or_else(|| {
                StashError::InvalidEntryName(format!("non UTF-8 name {:?}", entry.path()))
            })?
            .to_string();

        if entry.file_type().is_dir() {
            stack.push((name, DirTree::new()));
        } else {
            let contents = fs::read(entry.path())?;
            if let Some((_, parent)) = stack.last_mut() {
                parent.insert(name, DirNode::File(contents));
            }
        }
    }

    while stack.len() > 1 {
        close_dir(&mut stack);
    }
    Ok(stack.pop().map(|(_, root)| root).unwrap_or_default())
}

/// Pop the innermost open directory into its parent
fn close_dir(stack: &mut Vec<(String, DirTree)>) {
    if stack.len() < 2 {
        return;
    }
    if let Some((name, tree)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.insert(name, DirNode::Dir(tree));
        }
    }
}

/// Write a tree below `path`, creating directories as needed
///
/// Every name must be a single plain path component (not empty, `.`,
/// `..`, absolute, or containing a separator). The whole tree is checked
/// before anything is written.
pub fn write_tree(path: &Path, tree: &DirTree) -> Result<()> {
    check_names(tree)?;
    write_checked(path, tree)
}

fn write_checked(path: &Path, tree: &DirTree) -> Result<()> {
    fs::create_dir_all(path)?;

    for (name, node) in tree.iter() {
        let target = path.join(name);
        match node {
            DirNode::Dir(child) => write_checked(&target, child)?,
            DirNode::File(contents) => fs::write(&target, contents)?,
        }
    }
    Ok(())
}

fn check_names(tree: &DirTree) -> Result<()> {
    for (name, node) in tree.iter() {
        check_entry_name(name)?;
        if let DirNode::Dir(child) = node {
            check_names(child)?;
        }
    }
    Ok(())
}

/// Reject names that would not stay inside their parent directory
pub fn check_entry_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    );

    if name.is_empty() || name.chars().any(std::path::is_separator) || !single_normal {
        return Err(StashError::InvalidEntryName(format!("{:?}", name)));
    }
    Ok(())
}

/// Remove a directory and everything below it
///
/// A missing directory counts as success; other errors propagate.
pub fn clear_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}

pub fn is_dir(path: &Path) -> bool {
    path.is_dir()
}
