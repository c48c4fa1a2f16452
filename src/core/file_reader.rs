//! Unified file reading strategies
//!
//! Provides consistent handling for:
//! - Oversized files (capped reads with a visible note)
//! - Non-UTF-8 files (lossy conversion, never an error)
//! - Binary files (detected for explicit listings)
//! - Unreadable files (reported through a note, never raised)

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

use crate::core::util::truncate_string;

/// Bytes inspected when sniffing for binary content
pub const BINARY_SNIFF_LEN: usize = 8192;

/// Result of a capped, lossy file read
#[derive(Debug, Clone, Default)]
pub struct FileReadResult {
    /// The decoded content (empty when the read failed)
    pub content: String,

    /// Notes explaining why the content is short or missing
    pub notes: Vec<String>,

    /// Whether the content was truncated to the per-file cap
    pub truncated: bool,

    /// Whether lossy conversion was used
    pub lossy_conversion: bool,

    /// Size of the file on disk
    pub size: u64,
}

impl FileReadResult {
    /// Create a successful read result
    pub fn success(content: String, size: u64) -> Self {
        Self {
            content,
            size,
            ..Default::default()
        }
    }

    /// Create a failed read result carrying only a note
    pub fn failed(note: impl Into<String>) -> Self {
        Self {
            notes: vec![note.into()],
            ..Default::default()
        }
    }

    /// Mark as truncated
    pub fn with_truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    /// Mark as lossy conversion
    pub fn with_lossy(mut self) -> Self {
        self.lossy_conversion = true;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Read at most `per_file_cap` bytes of a file, never failing.
///
/// Oversized files are cut at a char boundary no later than the cap and carry a
/// `truncated, showing first {cap} of {size} bytes` note. Open/read failures
/// yield empty content and an `error reading file: {cause}` note.
pub fn read_file_safe(path: &Path, per_file_cap: usize) -> FileReadResult {
    match read_capped_bytes(path, per_file_cap) {
        Ok((bytes, size)) => {
            let (decoded, lossy) = match String::from_utf8(bytes) {
                Ok(s) => (s, false),
                Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
            };

            // Replacement characters can push lossy output past the cap
            let (content, _) = truncate_string(&decoded, per_file_cap);
            let mut result = FileReadResult::success(content.to_string(), size);

            if lossy {
                debug!(path = %path.display(), "lossy UTF-8 conversion applied");
                result = result.with_lossy();
            }

            if size > per_file_cap as u64 {
                debug!(path = %path.display(), size, per_file_cap, "file truncated to per-file cap");
                result = result.with_truncated().with_note(format!(
                    "truncated, showing first {} of {} bytes",
                    per_file_cap, size
                ));
            }

            result
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "failed to read file");
            FileReadResult::failed(format!("error reading file: {}", e))
        }
    }
}

/// Read up to `cap` bytes, returning them along with the size on disk
fn read_capped_bytes(path: &Path, cap: usize) -> io::Result<(Vec<u8>, u64)> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    let mut buffer = Vec::with_capacity(cap.min(size as usize));
    file.take(cap as u64).read_to_end(&mut buffer)?;

    Ok((buffer, size))
}

/// Outcome of a strict whole-file text read
#[derive(Debug)]
pub enum TextRead {
    Text(String),
    Binary,
    Failed(io::Error),
}

/// Heuristic binary check: NUL bytes within the first 8 KiB
pub fn looks_binary(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(BINARY_SNIFF_LEN);
    bytes[..check_len].contains(&0)
}

/// Read a whole file as text, classifying undecodable content as binary
pub fn read_text_strict(path: &Path) -> TextRead {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => return TextRead::Failed(e),
    };

    if looks_binary(&bytes) {
        return TextRead::Binary;
    }

    match String::from_utf8(bytes) {
        Ok(text) => TextRead::Text(text),
        Err(_) => TextRead::Binary,
    }
}
