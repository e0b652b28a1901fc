//! Path Confinement
//!
//! Maps URL paths onto a root directory without letting them climb out of it.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Joins a URL path onto `root`, segment by segment.
///
/// The path is percent-decoded first. Empty and `.` segments are dropped.
/// Returns `None` for any `..` segment, any segment carrying a backslash or
/// NUL, or undecodable input, so the result never leaves `root` lexically.
/// Symlinks are not followed here; callers that hit the disk check the
/// canonical location separately.
pub fn confine(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;

    let mut path = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains(['\\', '\0']) => return None,
            s => path.push(s),
        }
    }
    Some(path)
}
