//! Filesystem helpers
//!
//! Small directory utilities around the store:
//! - Read a directory recursively into a [`DirTree`] (natural name order)
//! - Write a [`DirTree`] back out, creating directories as needed and
//!   refusing names that would escape the target
//! - Clear a directory, treating a missing one as already cleared

mod natural;
mod tree;

pub use natural::natural_cmp;
pub use tree::{check_entry_name, clear_dir, exists, is_dir, read_tree, write_tree, DirNode, DirTree};
