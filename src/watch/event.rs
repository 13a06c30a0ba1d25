// src/watch/event.rs

//! Raw change events as delivered by a watch source.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use notify::event::ModifyKind;
use serde::Deserialize;

/// Coarse classification of a filesystem change.
///
/// The watcher never interprets the kind itself; it is only passed through to
/// filters and callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
    Access,
    Other,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Write => "WRITE",
            ChangeKind::Remove => "REMOVE",
            ChangeKind::Rename => "RENAME",
            ChangeKind::Chmod => "CHMOD",
            ChangeKind::Access => "ACCESS",
            ChangeKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(ChangeKind::Create),
            "write" => Ok(ChangeKind::Write),
            "remove" => Ok(ChangeKind::Remove),
            "rename" => Ok(ChangeKind::Rename),
            "chmod" => Ok(ChangeKind::Chmod),
            "access" => Ok(ChangeKind::Access),
            "other" => Ok(ChangeKind::Other),
            other => Err(format!(
                "invalid change kind: {other} (expected create, write, remove, rename, chmod, access or other)"
            )),
        }
    }
}

impl From<notify::EventKind> for ChangeKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => ChangeKind::Create,
            notify::EventKind::Modify(modify) => match modify {
                ModifyKind::Name(_) => ChangeKind::Rename,
                ModifyKind::Metadata(_) => ChangeKind::Chmod,
                _ => ChangeKind::Write,
            },
            notify::EventKind::Remove(_) => ChangeKind::Remove,
            notify::EventKind::Access(_) => ChangeKind::Access,
            _ => ChangeKind::Other,
        }
    }
}

/// A single `(path, kind)` change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Split a notify event into one `RawEvent` per affected path.
    pub fn from_notify(event: notify::Event) -> impl Iterator<Item = RawEvent> {
        let kind = ChangeKind::from(event.kind);
        event
            .paths
            .into_iter()
            .map(move |path| RawEvent::new(path, kind))
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path.display())
    }
}
