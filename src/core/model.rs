//! Context Model
//!
//! Categories, candidate files, rendered sections and line listings shared by
//! both assembly modes, plus the error type for precondition failures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Appended to file content cut short by the global budget
pub const BUDGET_TRUNCATION_NOTE: &str = "[Content truncated due to size limits]";

/// Failures that stop an assembly before any work is done
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Root directory not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("Root is not a directory: {}", path.display())]
    RootNotADirectory { path: PathBuf },

    #[error("Unrecognized GitHub URL format: {url}")]
    InvalidRepoUrl { url: String },

    #[error("git is not installed or not in PATH")]
    GitUnavailable,

    #[error("Failed to clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    #[error("git clone timed out after {secs} seconds")]
    CloneTimedOut { secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fixed file-purpose buckets, in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Documentation,
    EntryPoint,
    Config,
    Core,
}

impl Category {
    /// All categories in the order their sections appear
    pub const ALL: [Category; 4] = [
        Category::Documentation,
        Category::EntryPoint,
        Category::Config,
        Category::Core,
    ];

    /// Section title used in the document
    pub fn title(&self) -> &'static str {
        match self {
            Category::Documentation => "Documentation",
            Category::EntryPoint => "Entry Points",
            Category::Config => "Config",
            Category::Core => "Core",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documentation => "documentation",
            Category::EntryPoint => "entry_point",
            Category::Config => "config",
            Category::Core => "core",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file selected by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Path relative to root, using '/' as separator
    pub relative_path: String,
    pub category: Category,
    #[serde(skip)]
    pub absolute_path: PathBuf,
}

/// One file's contribution to a context document
#[derive(Debug, Clone, Serialize)]
pub struct FileBlock {
    pub path: String,

    /// Content bytes emitted (the budgeted amount)
    pub bytes: usize,

    /// Size of the file on disk
    pub source_bytes: u64,

    /// xxh3 digest of the emitted content
    pub hash: String,

    /// Whether invalid UTF-8 was replaced during decoding
    pub lossy: bool,

    /// Reader notes (per-file truncation, read errors)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,

    /// Whether the global budget cut this file short
    pub budget_truncated: bool,

    #[serde(skip)]
    pub content: String,
}

impl FileBlock {
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.notes.iter().map(|n| format!("[{}]", n)).collect();
        if !self.content.is_empty() {
            lines.push(self.content.clone());
        }
        if self.budget_truncated {
            lines.push(BUDGET_TRUNCATION_NOTE.to_string());
        }

        format!("### {}\n\n```\n{}\n```", self.path, lines.join("\n"))
    }
}

/// A titled block of the final document
#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    pub title: String,

    /// `None` for the file tree section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileBlock>,

    #[serde(skip)]
    body: String,
}

impl RenderedSection {
    /// The directory tree section
    pub fn tree(tree: &str) -> Self {
        Self {
            title: "File Tree".to_string(),
            category: None,
            files: Vec::new(),
            body: format!("```\n{}\n```", tree),
        }
    }

    /// A category section built from its file blocks
    pub fn category(category: Category, files: Vec<FileBlock>) -> Self {
        let body = files
            .iter()
            .map(FileBlock::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            title: category.title().to_string(),
            category: Some(category),
            files,
            body,
        }
    }

    pub fn render(&self) -> String {
        format!("## {}\n\n{}", self.title, self.body)
    }
}

/// Outcome of reading one explicitly requested file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStatus {
    Read,
    NotFound,
    NotAFile,
    Binary,
    Error,
}

impl FileStatus {
    /// Status line shown in place of content
    pub fn message(&self) -> &'static str {
        match self {
            FileStatus::Read => "Read",
            FileStatus::NotFound => "File not found",
            FileStatus::NotAFile => "Not a regular file",
            FileStatus::Binary => "Binary file (cannot display)",
            FileStatus::Error => "Error reading file",
        }
    }
}

/// One block of a line-numbered file listing
#[derive(Debug, Clone, Serialize)]
pub struct LineListing {
    pub path: String,
    pub status: FileStatus,
    pub line_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(skip)]
    pub content: Option<String>,
}

impl LineListing {
    /// A successfully read file
    pub fn read(
        path: impl Into<String>,
        content: String,
        line_count: usize,
        language: Option<&str>,
    ) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Read,
            line_count,
            language: language.map(str::to_string),
            note: None,
            content: Some(content),
        }
    }

    /// A file that could not be shown
    pub fn status(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            line_count: 0,
            language: None,
            note: None,
            content: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_read(&self) -> bool {
        self.status == FileStatus::Read
    }

    pub fn render(&self) -> String {
        match &self.content {
            Some(content) if self.is_read() => {
                let fence_lang = self.language.as_deref().unwrap_or("");
                let body = if content.is_empty() {
                    String::new()
                } else {
                    format!("{}\n", content)
                };
                format!(
                    "### {} ({} lines)\n\n```{}\n{}```",
                    self.path, self.line_count, fence_lang, body
                )
            }
            _ => {
                let message = match &self.note {
                    Some(note) => format!("{}: {}", self.status.message(), note),
                    None => self.status.message().to_string(),
                };
                format!("### {}\n\n[{}]", self.path, message)
            }
        }
    }
}
