use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use treewatch::errors::{Result, TreewatchError};
use treewatch::watch::WatchSource;

/// A watch source that:
/// - records which directories were registered, in order
/// - refuses registration for paths marked with `fail_on`.
///
/// Events are not produced by the source itself; tests push them through
/// the `EventSenders` half of `event_channel()`.
#[derive(Debug, Clone, Default)]
pub struct FakeSource {
    added: Arc<Mutex<Vec<PathBuf>>>,
    failing: HashSet<PathBuf>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    pub fn added(&self) -> Vec<PathBuf> {
        self.added.lock().unwrap().clone()
    }
}

impl WatchSource for FakeSource {
    fn add(&mut self, path: &Path) -> Result<()> {
        if self.failing.contains(path) {
            return Err(TreewatchError::NotifyError(
                notify::Error::generic("permission denied").add_path(path.to_path_buf()),
            ));
        }
        self.added.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
