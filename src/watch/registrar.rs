// src/watch/registrar.rs

//! Recursive registration of a directory tree with a watch source.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, TreewatchError};
use crate::fs::FileSystem;
use crate::logging::WatchLog;
use crate::watch::source::WatchSource;

/// Register `root` and every directory below it with `source`.
///
/// Returns the number of directories that were registered.
///
/// - Files are never registered; the source reports them through their
///   parent directory.
/// - A directory the source refuses is logged and skipped along with its
///   subtree. The walk carries on with its siblings.
/// - A directory that cannot be listed aborts the walk with that error.
/// - A missing root is an error; a root that is a plain file registers
///   nothing.
pub fn add_recursive<S>(
    source: &mut S,
    fs: &dyn FileSystem,
    root: &Path,
    log: &dyn WatchLog,
) -> Result<usize>
where
    S: WatchSource + ?Sized,
{
    if !fs.exists(root) {
        return Err(TreewatchError::RootNotFound(root.to_path_buf()));
    }

    let mut registered = 0;
    // Depth-first, lexical order: children are pushed in reverse.
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        if !fs.is_dir(&dir) {
            continue;
        }

        if let Err(err) = source.add(&dir) {
            log.registration_failed(&dir, &err);
            continue;
        }
        log.registered(&dir);
        registered += 1;

        let children = fs.read_dir(&dir)?;
        stack.extend(children.into_iter().rev());
    }

    debug!(?root, registered, "recursive registration complete");
    Ok(registered)
}
