//! Directory tree rendering
//!
//! Walks a root directory one level at a time with walkdir and draws an ASCII
//! tree with box-drawing connectors. Hidden entries and noise directories are
//! left out, files are capped per directory, and levels below the depth limit
//! are omitted without a marker.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::limits::Limits;
use crate::core::paths::{dir_name, is_hidden_name, resolve_root};
use crate::core::render::{Document, RenderConfig, Renderer};

/// Directories never shown in the tree
pub const NOISE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "dist",
    "build",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    "target",
    "vendor",
];

pub fn is_noise_dir(name: &str) -> bool {
    NOISE_DIRS.contains(&name)
}

/// Tree rendering limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub max_depth: usize,
    pub max_files_per_dir: usize,
}

impl From<&Limits> for TreeOptions {
    fn from(limits: &Limits) -> Self {
        Self {
            max_depth: limits.max_tree_depth,
            max_files_per_dir: limits.max_files_per_dir,
        }
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self::from(&Limits::default())
    }
}

/// Visible children of one directory, each list sorted case-insensitively
#[derive(Debug, Default)]
struct DirListing {
    dirs: Vec<(String, PathBuf)>,
    files: Vec<String>,
}

fn sort_key(name: &str) -> (String, &str) {
    (name.to_lowercase(), name)
}

/// List a directory's immediate children; unreadable entries are skipped
fn list_dir(path: &Path) -> DirListing {
    let mut listing = DirListing::default();

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden_name(&name) {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if !is_noise_dir(&name) {
                listing.dirs.push((name, entry.into_path()));
            }
        } else if file_type.is_file() {
            listing.files.push(name);
        }
    }

    listing.dirs.sort_by(|a, b| sort_key(&a.0).cmp(&sort_key(&b.0)));
    listing.files.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    listing
}

fn walk(path: &Path, prefix: &str, depth: usize, opts: &TreeOptions, lines: &mut Vec<String>) {
    if depth > opts.max_depth {
        return;
    }

    let DirListing { dirs, mut files } = list_dir(path);

    let hidden_files = files.len().saturating_sub(opts.max_files_per_dir);
    files.truncate(opts.max_files_per_dir);
    let truncated = hidden_files > 0;

    let total = dirs.len() + files.len();
    let mut index = 0;

    for (name, dir_path) in &dirs {
        let is_last = index + 1 == total && !truncated;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}/", prefix, connector, name));

        let extension = if is_last { "    " } else { "│   " };
        walk(dir_path, &format!("{}{}", prefix, extension), depth + 1, opts, lines);
        index += 1;
    }

    for name in &files {
        let is_last = index + 1 == total && !truncated;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, name));
        index += 1;
    }

    if truncated {
        lines.push(format!("{}└── ... ({} more files)", prefix, hidden_files));
    }
}

/// Render the tree under `root`, starting with a `{root name}/` line
pub fn render_tree(root: &Path, opts: &TreeOptions) -> String {
    let mut lines = vec![format!("{}/", dir_name(root))];
    walk(root, "", 0, opts, &mut lines);
    lines.join("\n")
}

/// Standalone tree output for the `tree` command
#[derive(Debug, Serialize)]
pub struct TreeReport {
    pub root: String,
    pub max_depth: usize,
    pub tree: String,
}

impl Document for TreeReport {
    fn to_markdown(&self) -> String {
        self.tree.clone()
    }
}

/// Run the tree command
pub fn run_tree(
    root: &Path,
    limits: &Limits,
    config: RenderConfig,
    output: Option<&Path>,
) -> Result<()> {
    let root = resolve_root(root)?;
    let opts = TreeOptions::from(limits);

    let report = TreeReport {
        root: root.display().to_string(),
        max_depth: opts.max_depth,
        tree: render_tree(&root, &opts),
    };

    Renderer::with_config(config).emit(&report, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_render_basic_tree() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("src/main.rs"));
        touch(&temp.path().join("README.md"));
        touch(&temp.path().join("Cargo.toml"));

        let tree = render_tree(temp.path(), &TreeOptions::default());
        let expected = format!(
            "{}/\n├── src/\n│   └── main.rs\n├── Cargo.toml\n└── README.md",
            dir_name(temp.path())
        );
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_empty_root_renders_only_root_line() {
        let temp = tempdir().unwrap();
        let tree = render_tree(temp.path(), &TreeOptions::default());
        assert_eq!(tree, format!("{}/", dir_name(temp.path())));
    }

    #[test]
    fn test_noise_and_hidden_entries_excluded() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join(".git/config"));
        touch(&temp.path().join("node_modules/pkg/index.js"));
        touch(&temp.path().join("target/debug/app"));
        touch(&temp.path().join(".env"));
        touch(&temp.path().join("lib/.hidden.py"));
        touch(&temp.path().join("lib/visible.py"));

        let tree = render_tree(temp.path(), &TreeOptions::default());
        assert!(!tree.contains(".git"));
        assert!(!tree.contains("node_modules"));
        assert!(!tree.contains("target"));
        assert!(!tree.contains(".env"));
        assert!(!tree.contains(".hidden.py"));
        assert!(tree.contains("visible.py"));
    }

    #[test]
    fn test_dirs_before_files_case_insensitive() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("b.txt"));
        touch(&temp.path().join("A.txt"));
        touch(&temp.path().join("zeta/z.txt"));
        touch(&temp.path().join("Alpha/a.txt"));

        let tree = render_tree(temp.path(), &TreeOptions::default());
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines[1], "├── Alpha/");
        assert_eq!(lines[3], "├── zeta/");
        assert_eq!(lines[5], "├── A.txt");
        assert_eq!(lines[6], "└── b.txt");
    }

    #[test]
    fn test_file_cap_marker_is_last_sibling() {
        let temp = tempdir().unwrap();
        for i in 0..13 {
            touch(&temp.path().join(format!("file{:02}.txt", i)));
        }

        let tree = render_tree(temp.path(), &TreeOptions::default());
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 1 + 10 + 1);
        assert_eq!(lines[10], "├── file09.txt");
        assert_eq!(lines[11], "└── ... (3 more files)");
        assert!(!tree.contains("file10.txt"));
    }

    #[test]
    fn test_file_cap_counts_only_visible_files() {
        let temp = tempdir().unwrap();
        for i in 0..11 {
            touch(&temp.path().join(format!("f{:02}.txt", i)));
        }
        touch(&temp.path().join(".hidden"));
        touch(&temp.path().join("sub/a.txt"));

        let tree = render_tree(temp.path(), &TreeOptions::default());
        assert!(tree.ends_with("└── ... (1 more files)"));
        assert!(tree.contains("├── sub/\n│   └── a.txt"));
    }

    #[test]
    fn test_depth_limit_without_marker() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("a/b/c/d/e/f/g.txt"));

        let tree = render_tree(temp.path(), &TreeOptions::default());
        assert!(tree.contains("e/"));
        assert!(!tree.contains("f/"));
        assert!(!tree.contains("g.txt"));
        assert!(!tree.contains("..."));
    }

    #[test]
    fn test_depth_zero_lists_only_root_children() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join("top/inner.txt"));
        touch(&temp.path().join("root.txt"));

        let opts = TreeOptions {
            max_depth: 0,
            max_files_per_dir: 10,
        };
        let tree = render_tree(temp.path(), &opts);
        assert!(tree.contains("top/"));
        assert!(tree.contains("root.txt"));
        assert!(!tree.contains("inner.txt"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let temp = tempdir().unwrap();
        for name in ["z.rs", "a.rs", "M.rs", "docs/x.md", "docs/y.md", "src/lib.rs"] {
            touch(&temp.path().join(name));
        }

        let first = render_tree(temp.path(), &TreeOptions::default());
        let second = render_tree(temp.path(), &TreeOptions::default());
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        touch(&temp.path().join("locked/secret.txt"));
        touch(&temp.path().join("open.txt"));
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores permission bits
        let still_readable = fs::read_dir(&locked).is_ok();

        let tree = render_tree(temp.path(), &TreeOptions::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(tree.contains("locked/"));
        assert!(tree.contains("open.txt"));
        if !still_readable {
            assert!(!tree.contains("secret.txt"));
        }
    }

    #[test]
    fn test_is_noise_dir() {
        assert!(is_noise_dir("node_modules"));
        assert!(is_noise_dir("__pycache__"));
        assert!(!is_noise_dir("src"));
    }
}
