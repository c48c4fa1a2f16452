//! Backends module - Filesystem-facing building blocks
//!
//! Provides:
//! - tree: Directory tree rendering
//! - classify: Key file classification into fixed categories
//! - acquire: Local roots and shallow GitHub clones

pub mod acquire;
pub mod classify;
pub mod tree;
