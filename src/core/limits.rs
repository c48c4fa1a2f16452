//! Assembly limits
//!
//! The size and count caps that bound every context document.

use serde::{Deserialize, Serialize};

/// Maximum bytes of content taken from a single file (100 KiB)
pub const DEFAULT_PER_FILE_CAP: usize = 100 * 1024;

/// Maximum bytes of file content across a whole document (500 KiB)
pub const DEFAULT_TOTAL_CAP: usize = 500 * 1024;

/// Deepest level the tree renderer descends to
pub const DEFAULT_MAX_TREE_DEPTH: usize = 4;

/// Candidate files kept per category
pub const DEFAULT_MAX_FILES_PER_CATEGORY: usize = 5;

/// Files listed per directory before the "... N more files" marker
pub const DEFAULT_MAX_FILES_PER_DIR: usize = 10;

/// Markdown files picked up from `docs/`
pub const DEFAULT_DOCS_MARKDOWN_CAP: usize = 3;

/// Core files taken per source directory and extension
pub const DEFAULT_CORE_FILES_PER_EXTENSION: usize = 2;

/// Limits applied while assembling a context document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub per_file_cap: usize,
    pub total_cap: usize,
    pub max_tree_depth: usize,
    pub max_files_per_category: usize,
    pub max_files_per_dir: usize,
    pub docs_markdown_cap: usize,
    pub core_files_per_extension: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            per_file_cap: DEFAULT_PER_FILE_CAP,
            total_cap: DEFAULT_TOTAL_CAP,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_files_per_category: DEFAULT_MAX_FILES_PER_CATEGORY,
            max_files_per_dir: DEFAULT_MAX_FILES_PER_DIR,
            docs_markdown_cap: DEFAULT_DOCS_MARKDOWN_CAP,
            core_files_per_extension: DEFAULT_CORE_FILES_PER_EXTENSION,
        }
    }
}

impl Limits {
    pub fn with_per_file_cap(mut self, cap: usize) -> Self {
        self.per_file_cap = cap;
        self
    }

    pub fn with_total_cap(mut self, cap: usize) -> Self {
        self.total_cap = cap;
        self
    }

    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }

    pub fn with_max_files_per_category(mut self, n: usize) -> Self {
        self.max_files_per_category = n;
        self
    }
}
