//! Path expansion and normalisation helpers.

use std::path::{Component, Path, PathBuf};

/// Expand `~` and environment variables in a configured path.
///
/// Unknown variables leave the string as written after tilde expansion.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(raw).into_owned());
    PathBuf::from(expanded)
}

/// Normalise a path for identity comparison.
///
/// Existing paths are canonicalised. For paths that do not exist yet the
/// nearest existing ancestor is canonicalised and the rest is appended
/// lexically, so `dst/../src/file` and `src/file` compare equal.
pub fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    let lexical = lexical_clean(&absolute);

    let mut existing = lexical.as_path();
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }

    let mut result = dunce::canonicalize(existing).unwrap_or_else(|_| existing.to_path_buf());
    for name in tail.into_iter().rev() {
        result.push(name);
    }
    result
}

/// Whether `name` can be used as a single version folder name.
///
/// Exactly one normal path component: no separators, not empty, not `.`
/// or `..`.
pub fn is_folder_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

/// Resolve `.` and `..` components without touching the filesystem.
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
