//! Filesystem helpers shared by the catalog and transfer code.

use std::io;
use std::path::{Path, PathBuf};

/// Characters replaced with `_` in every path segment.
const ILLEGAL_CHARS: &[char] = &[
    '\\', '/', '*', '?', ':', '"', '<', '>', '|', '\t', '\n', '\r', '\u{8}',
];

/// Replace filesystem-illegal characters in a single path segment.
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if ILLEGAL_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Sanitize a server-provided relative path.
///
/// The name is split on `/` so legitimate separators survive, each
/// segment is sanitized on its own, and `.`/`..`/empty segments are
/// dropped so the result can never climb out of the directory it is
/// joined onto.
pub fn sanitize_path(name: &str) -> PathBuf {
    let path: PathBuf = name
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(sanitize_segment)
        .collect();

    if path.as_os_str().is_empty() {
        PathBuf::from("_")
    } else {
        path
    }
}

/// Look up a directory named `name` inside `parent`, ignoring case.
pub fn find_dir_case_insensitive(parent: &Path, name: &str) -> Option<PathBuf> {
    let wanted = name.to_lowercase();
    std::fs::read_dir(parent)
        .ok()?
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_name().to_string_lossy().to_lowercase() == wanted
                && entry.path().is_dir()
        })
        .map(|entry| entry.path())
}

/// Make sure `dir` exists and return the directory to actually write into.
///
/// On case-insensitive filesystems creation can fail because a sibling
/// with different casing already exists. In that case the existing
/// sibling is returned instead. The original error is returned only when
/// no such sibling can be found.
pub fn ensure_dir(dir: &Path) -> io::Result<PathBuf> {
    let err = match std::fs::create_dir_all(dir) {
        Ok(()) => return Ok(dir.to_path_buf()),
        Err(err) => err,
    };

    let (Some(parent), Some(name)) = (dir.parent(), dir.file_name()) else {
        return Err(err);
    };
    if !parent.is_dir() {
        return Err(err);
    }

    find_dir_case_insensitive(parent, &name.to_string_lossy()).ok_or(err)
}
