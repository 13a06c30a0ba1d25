// src/watch/path_utils.rs

use std::path::Path;

/// Express `path` relative to `root` as a forward-slash string, for glob
/// matching.
///
/// Tries a plain prefix strip first, then retries with both sides
/// canonicalized (macOS reports `/private/var/...` for `/var/...`). Removed
/// files cannot be canonicalized, so only the first attempt applies to them.
///
/// Returns `None` for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok()?;
    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
