//! Listing flow - Line-numbered file packaging
//!
//! Renders an explicit, caller-chosen list of files with line numbers and a
//! fenced-block language tag. No budget applies: every requested file is
//! either shown in full or replaced by a status block saying why it is not.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::file_reader::{read_text_strict, TextRead};
use crate::core::model::{FileStatus, LineListing};
use crate::core::paths::{join_within, resolve_root};
use crate::core::render::{Document, RenderConfig, Renderer};

/// Fenced-block language tags by file extension
pub const LANGUAGE_TAGS: &[(&str, &str)] = &[
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "jsx"),
    ("ts", "typescript"),
    ("tsx", "tsx"),
    ("go", "go"),
    ("rs", "rust"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("swift", "swift"),
    ("rb", "ruby"),
    ("php", "php"),
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "zsh"),
    ("sql", "sql"),
    ("html", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("md", "markdown"),
];

/// Tags for files identified by their whole name
pub const FILENAME_TAGS: &[(&str, &str)] = &[("Dockerfile", "dockerfile"), ("Makefile", "makefile")];

/// Language tag for a path, by file name first and extension second
pub fn language_for(path: &str) -> Option<&'static str> {
    let path = Path::new(path);
    let name = path.file_name().and_then(|n| n.to_str())?;

    if let Some((_, tag)) = FILENAME_TAGS.iter().find(|(n, _)| *n == name) {
        return Some(*tag);
    }

    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
    LANGUAGE_TAGS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, tag)| *tag)
}

/// Prefix each line with its number, right-aligned to the widest number.
/// Returns the rendered text and the line count.
pub fn number_lines(content: &str) -> (String, usize) {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.len().to_string().len();

    let numbered = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n");

    (numbered, lines.len())
}

fn plain_lines(content: &str) -> (String, usize) {
    let lines: Vec<&str> = content.lines().collect();
    (lines.join("\n"), lines.len())
}

/// Build the listing block for one requested path
fn list_file(root: &Path, requested: &str, line_numbers: bool) -> LineListing {
    let Some(path) = join_within(root, requested) else {
        return LineListing::status(requested, FileStatus::Error)
            .with_note("path is outside the root directory");
    };

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return LineListing::status(requested, FileStatus::NotFound);
        }
        Err(e) => {
            return LineListing::status(requested, FileStatus::Error).with_note(e.to_string());
        }
    };

    if !metadata.is_file() {
        return LineListing::status(requested, FileStatus::NotAFile);
    }

    match read_text_strict(&path) {
        TextRead::Text(text) => {
            let (content, line_count) = if line_numbers {
                number_lines(&text)
            } else {
                plain_lines(&text)
            };
            LineListing::read(requested, content, line_count, language_for(requested))
        }
        TextRead::Binary => LineListing::status(requested, FileStatus::Binary),
        TextRead::Failed(e) => {
            LineListing::status(requested, FileStatus::Error).with_note(e.to_string())
        }
    }
}

/// A line-numbered listing of caller-chosen files
#[derive(Debug, Clone, Serialize)]
pub struct FileListingReport {
    pub root: String,
    pub read: usize,
    pub missing: usize,
    pub files: Vec<LineListing>,
    pub document: String,
}

impl Document for FileListingReport {
    fn to_markdown(&self) -> String {
        self.document.clone()
    }
}

/// Package `paths` (relative to `root`) in the order given
pub fn package_files(root: &Path, paths: &[String], line_numbers: bool) -> FileListingReport {
    let mut read = 0;
    let mut missing = 0;
    let mut files = Vec::with_capacity(paths.len());

    for requested in paths {
        let listing = list_file(root, requested, line_numbers);
        if listing.is_read() {
            read += 1;
            debug!(path = %requested, lines = listing.line_count, "file listed");
        } else {
            missing += 1;
            warn!(path = %requested, status = listing.status.message(), "file not listed");
        }
        files.push(listing);
    }

    let document = files
        .iter()
        .map(LineListing::render)
        .collect::<Vec<_>>()
        .join("\n\n");

    FileListingReport {
        root: root.display().to_string(),
        read,
        missing,
        files,
        document,
    }
}

/// Run the files command
pub fn run_files(
    root: &Path,
    paths: &[String],
    line_numbers: bool,
    show_stats: bool,
    config: RenderConfig,
    output: Option<&Path>,
) -> Result<()> {
    let root = resolve_root(root)?;
    let report = package_files(&root, paths, line_numbers);

    if show_stats {
        eprintln!("{}", "Listing Statistics:".cyan().bold());
        eprintln!("   Read: {}", report.read.to_string().green());
        if report.missing > 0 {
            eprintln!("   Missing: {}", report.missing.to_string().yellow());
        } else {
            eprintln!("   Missing: 0");
        }
        eprintln!();
    }

    Renderer::with_config(config).emit(&report, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn strings(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_language_for() {
        assert_eq!(language_for("a.py"), Some("python"));
        assert_eq!(language_for("src/lib.rs"), Some("rust"));
        assert_eq!(language_for("web/App.TSX"), Some("tsx"));
        assert_eq!(language_for("Dockerfile"), Some("dockerfile"));
        assert_eq!(language_for("build/Makefile"), Some("makefile"));
        assert_eq!(language_for("notes.unknown"), None);
        assert_eq!(language_for("LICENSE"), None);
    }

    #[test]
    fn test_language_table_has_unique_extensions() {
        let mut exts: Vec<&str> = LANGUAGE_TAGS.iter().map(|(e, _)| *e).collect();
        let before = exts.len();
        exts.sort();
        exts.dedup();
        assert_eq!(exts.len(), before);
    }

    #[test]
    fn test_number_lines_right_aligned() {
        let content = (1..=10)
            .map(|i| format!("line{}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let (numbered, count) = number_lines(&content);
        let lines: Vec<&str> = numbered.lines().collect();
        assert_eq!(count, 10);
        assert_eq!(lines[0], " 1: line1");
        assert_eq!(lines[9], "10: line10");
    }

    #[test]
    fn test_number_lines_trailing_newline_and_crlf() {
        let (numbered, count) = number_lines("a\r\nb\n");
        assert_eq!(count, 2);
        assert_eq!(numbered, "1: a\n2: b");

        let (empty, count) = number_lines("");
        assert_eq!(count, 0);
        assert_eq!(empty, "");
    }

    #[test]
    fn test_missing_file_tolerance() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.py"), "x = 1\ny = 2\n").unwrap();
        fs::write(temp.path().join("b.bin"), [0u8, 159, 146, 150]).unwrap();

        let report = package_files(
            temp.path(),
            &strings(&["a.py", "missing.txt", "b.bin"]),
            true,
        );

        assert_eq!(report.read, 1);
        assert_eq!(report.missing, 2);
        let statuses: Vec<FileStatus> = report.files.iter().map(|f| f.status).collect();
        assert_eq!(
            statuses,
            vec![FileStatus::Read, FileStatus::NotFound, FileStatus::Binary]
        );
        assert_eq!(
            report.document,
            "### a.py (2 lines)\n\n```python\n1: x = 1\n2: y = 2\n```\n\n\
             ### missing.txt\n\n[File not found]\n\n\
             ### b.bin\n\n[Binary file (cannot display)]"
        );
    }

    #[test]
    fn test_paths_outside_root_are_refused() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("project");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.py"), "pass\n").unwrap();
        fs::write(outer.path().join("secret.txt"), "TOPSECRET\n").unwrap();

        let absolute = outer.path().join("secret.txt").to_string_lossy().into_owned();
        let report = package_files(
            &root,
            &strings(&[&absolute, "../secret.txt", "a.py"]),
            true,
        );

        assert_eq!(report.read, 1);
        assert_eq!(report.missing, 2);
        assert_eq!(report.files[0].status, FileStatus::Error);
        assert_eq!(report.files[1].status, FileStatus::Error);
        assert!(!report.document.contains("TOPSECRET"));
        assert!(report.document.contains(
            "### ../secret.txt\n\n[Error reading file: path is outside the root directory]"
        ));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();

        let report = package_files(temp.path(), &strings(&["src"]), true);
        assert_eq!(report.files[0].status, FileStatus::NotAFile);
        assert_eq!(report.missing, 1);
        assert!(report.document.contains("[Not a regular file]"));
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("latin1.txt"), [0x63, 0x61, 0x66, 0xE9]).unwrap();

        let report = package_files(temp.path(), &strings(&["latin1.txt"]), true);
        assert_eq!(report.files[0].status, FileStatus::Binary);
    }

    #[test]
    fn test_without_line_numbers() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("Makefile"), "all:\n\tcargo build\n").unwrap();

        let report = package_files(temp.path(), &strings(&["Makefile"]), false);
        assert_eq!(
            report.document,
            "### Makefile (2 lines)\n\n```makefile\nall:\n\tcargo build\n```"
        );
    }

    #[test]
    fn test_nested_path_and_order_preserved() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/lib.rs"), "pub fn a() {}\n").unwrap();
        fs::write(temp.path().join("README.md"), "# R\n").unwrap();

        let report = package_files(temp.path(), &strings(&["src/lib.rs", "README.md"]), true);
        let paths: Vec<&str> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/lib.rs", "README.md"]);
        assert_eq!(report.files[0].language.as_deref(), Some("rust"));
        assert_eq!(report.read, 2);
    }

    #[test]
    fn test_empty_request() {
        let temp = tempdir().unwrap();
        let report = package_files(temp.path(), &[], true);
        assert_eq!(report.read, 0);
        assert_eq!(report.missing, 0);
        assert!(report.document.is_empty());
    }

    #[test]
    fn test_json_shape() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.py"), "pass\n").unwrap();

        let report = package_files(temp.path(), &strings(&["a.py", "gone.py"]), true);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["read"], 1);
        assert_eq!(value["missing"], 1);
        assert_eq!(value["files"][0]["status"], "read");
        assert_eq!(value["files"][0]["language"], "python");
        assert_eq!(value["files"][0]["line_count"], 1);
        assert_eq!(value["files"][1]["status"], "notFound");
        assert!(value["files"][1].get("content").is_none());
    }
}
