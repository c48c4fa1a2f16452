//! Flows module - The two document assembly modes
//!
//! Provides:
//! - context: Budgeted repository context (tree + key files)
//! - listing: Line-numbered listing of caller-chosen files

pub mod context;
pub mod listing;
