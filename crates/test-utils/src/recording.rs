use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use treewatch::errors::TreewatchError;
use treewatch::logging::WatchLog;
use treewatch::watch::{RawEvent, SharedCallback};

/// One diagnostic captured by [`RecordingLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Registered(PathBuf),
    RegistrationFailed(PathBuf, String),
    UpstreamError(String),
    Idle(Duration),
    Fired(RawEvent),
}

/// `WatchLog` that keeps every entry in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::Registered(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<PathBuf> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::RegistrationFailed(p, _) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn upstream_errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                LogEntry::UpstreamError(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn idle_count(&self) -> usize {
        self.entries()
            .iter()
            .filter(|e| matches!(e, LogEntry::Idle(_)))
            .count()
    }

    fn push(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

impl WatchLog for RecordingLog {
    fn registered(&self, path: &Path) {
        self.push(LogEntry::Registered(path.to_path_buf()));
    }

    fn registration_failed(&self, path: &Path, err: &TreewatchError) {
        self.push(LogEntry::RegistrationFailed(path.to_path_buf(), err.to_string()));
    }

    fn upstream_error(&self, err: &notify::Error) {
        self.push(LogEntry::UpstreamError(err.to_string()));
    }

    fn idle(&self, interval: Duration) {
        self.push(LogEntry::Idle(interval));
    }

    fn fired(&self, event: &RawEvent) {
        self.push(LogEntry::Fired(event.clone()));
    }
}

/// A callback invocation captured by [`CallbackRecorder`].
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: RawEvent,
    pub at: Instant,
}

/// Collects callback invocations together with the (Tokio) time they
/// happened at, so paused-clock tests can check exact firing times.
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    calls: Arc<Mutex<Vec<Delivery>>>,
}

impl CallbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl Fn(RawEvent) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |event| {
            calls.lock().unwrap().push(Delivery {
                event,
                at: Instant::now(),
            });
        }
    }

    pub fn shared(&self) -> SharedCallback {
        Arc::new(self.callback())
    }

    pub fn calls(&self) -> Vec<Delivery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, path: impl AsRef<Path>) -> Vec<Delivery> {
        let path = path.as_ref();
        self.calls()
            .into_iter()
            .filter(|d| d.event.path == path)
            .collect()
    }
}
