//! Path helpers
//!
//! Root resolution plus the '/'-separated, root-relative paths shown in documents.

use std::path::{Component, Path, PathBuf};

use crate::core::model::ContextError;

/// Render a path with '/' separators
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// `path` relative to `root`, or `None` when it lies outside
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Check if a file name is hidden (starts with '.')
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Display name of a directory: its last component, or the path itself for `/`
pub fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| normalize_path(path))
}

/// Join a caller-supplied relative path onto `root`, or `None` when it would
/// land outside: absolute paths, drive prefixes, and `..` climbing above `root`.
/// Symlinks that resolve outside `root` are rejected as well.
pub fn join_within(root: &Path, requested: &str) -> Option<PathBuf> {
    let mut depth = 0usize;
    for component in Path::new(requested).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => depth = depth.checked_sub(1)?,
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let joined = root.join(requested);
    match (joined.canonicalize(), root.canonicalize()) {
        (Ok(real), Ok(real_root)) if !real.starts_with(&real_root) => None,
        _ => Some(joined),
    }
}

/// Resolve a root directory, failing fast when it is missing or not a directory
pub fn resolve_root(root: &Path) -> Result<PathBuf, ContextError> {
    let resolved = root
        .canonicalize()
        .map_err(|_| ContextError::RootNotFound {
            path: root.to_path_buf(),
        })?;

    if !resolved.is_dir() {
        return Err(ContextError::RootNotADirectory { path: resolved });
    }

    Ok(resolved)
}
