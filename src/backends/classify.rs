//! Key file classification
//!
//! Matches a root directory against fixed lookup tables and picks the files
//! worth showing an agent: documentation, entry points, config and a sample of
//! core sources. Every category is clipped to `max_files_per_category`, keeping
//! discovery order. A file may land in more than one category.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::limits::Limits;
use crate::core::model::{CandidateFile, Category};
use crate::core::paths::{is_hidden_name, make_relative, resolve_root};
use crate::core::render::{Document, RenderConfig, Renderer};

/// Root-level documentation, in priority order
pub const DOC_FILES: &[&str] = &[
    "README.md",
    "README.rst",
    "README.txt",
    "README",
    "CONTRIBUTING.md",
    "ARCHITECTURE.md",
    "DESIGN.md",
];

/// Directory scanned (non-recursively) for extra markdown docs
pub const DOCS_DIR: &str = "docs";

/// Canonical entry-point locations across language conventions
pub const ENTRY_POINT_FILES: &[&str] = &[
    // Python
    "main.py",
    "app.py",
    "run.py",
    "__main__.py",
    "cli.py",
    "src/main.py",
    "src/app.py",
    "src/__main__.py",
    // JavaScript/TypeScript
    "index.js",
    "index.ts",
    "main.js",
    "main.ts",
    "app.js",
    "app.ts",
    "src/index.js",
    "src/index.ts",
    "src/main.js",
    "src/main.ts",
    // Go
    "main.go",
    "cmd/main.go",
    // Rust
    "src/main.rs",
    "src/lib.rs",
];

/// Manifest, lock and build files across ecosystems
pub const CONFIG_FILES: &[&str] = &[
    // Python
    "pyproject.toml",
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "Pipfile",
    "poetry.lock",
    // JavaScript
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "tsconfig.json",
    // Go
    "go.mod",
    "go.sum",
    // Rust
    "Cargo.toml",
    "Cargo.lock",
    // General
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    ".env.example",
];

/// Source roots sampled for core files
pub const CORE_DIRS: &[&str] = &["src", "lib", "pkg", "internal", "app"];

/// Source extensions sampled in each core dir, in order
pub const CORE_EXTENSIONS: &[&str] = &["py", "js", "ts", "go", "rs"];

/// Selected files per category, iterated in document order
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyFiles {
    categories: BTreeMap<Category, Vec<CandidateFile>>,
}

impl KeyFiles {
    pub fn get(&self, category: Category) -> &[CandidateFile] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories in fixed order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[CandidateFile])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn push(&mut self, root: &Path, category: Category, absolute_path: PathBuf) {
        let relative_path = make_relative(&absolute_path, root)
            .unwrap_or_else(|| absolute_path.display().to_string());
        self.categories
            .entry(category)
            .or_default()
            .push(CandidateFile {
                relative_path,
                category,
                absolute_path,
            });
    }

    fn clip(&mut self, max_per_category: usize) {
        for files in self.categories.values_mut() {
            files.truncate(max_per_category);
        }
    }
}

/// Visible regular files directly inside `dir`, in directory-listing order
fn files_in_listing_order(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_hidden_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect()
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

/// Exact-name matches of `names` under `root` that are regular files
fn existing_files<'a>(
    root: &'a Path,
    names: &'static [&'static str],
) -> impl Iterator<Item = PathBuf> + 'a {
    names
        .iter()
        .map(move |name| root.join(name))
        .filter(|path| path.is_file())
}

/// Classify key files under a resolved root
pub fn find_key_files(root: &Path, limits: &Limits) -> KeyFiles {
    let mut key_files = KeyFiles::default();

    for path in existing_files(root, DOC_FILES) {
        key_files.push(root, Category::Documentation, path);
    }

    let docs_dir = root.join(DOCS_DIR);
    if docs_dir.is_dir() {
        files_in_listing_order(&docs_dir)
            .into_iter()
            .filter(|path| has_extension(path, "md"))
            .take(limits.docs_markdown_cap)
            .for_each(|path| key_files.push(root, Category::Documentation, path));
    }

    for path in existing_files(root, ENTRY_POINT_FILES) {
        key_files.push(root, Category::EntryPoint, path);
    }

    for path in existing_files(root, CONFIG_FILES) {
        key_files.push(root, Category::Config, path);
    }

    for dir_name in CORE_DIRS {
        let dir = root.join(dir_name);
        if !dir.is_dir() {
            continue;
        }

        let listing = files_in_listing_order(&dir);
        for ext in CORE_EXTENSIONS {
            listing
                .iter()
                .filter(|path| has_extension(path, ext))
                .take(limits.core_files_per_extension)
                .for_each(|path| key_files.push(root, Category::Core, path.clone()));
        }
    }

    key_files.clip(limits.max_files_per_category);

    for (category, files) in key_files.iter() {
        debug!(category = %category, count = files.len(), "classified key files");
    }
    debug!(total = key_files.total(), "key file classification done");

    key_files
}

/// Output of the `keys` command
#[derive(Debug, Serialize)]
pub struct KeyFilesReport {
    pub root: String,
    pub key_files: KeyFiles,
}

impl Document for KeyFilesReport {
    fn to_markdown(&self) -> String {
        if self.key_files.is_empty() {
            return "No key files found.".to_string();
        }

        self.key_files
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(category, files)| {
                let items: Vec<String> = files
                    .iter()
                    .map(|f| format!("- `{}`", f.relative_path))
                    .collect();
                format!("## {}\n\n{}", category.title(), items.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Run the keys command
pub fn run_keys(
    root: &Path,
    limits: &Limits,
    config: RenderConfig,
    output: Option<&Path>,
) -> Result<()> {
    let root = resolve_root(root)?;
    let report = KeyFilesReport {
        root: root.display().to_string(),
        key_files: find_key_files(&root, limits),
    };

    Renderer::with_config(config).emit(&report, output)
}
