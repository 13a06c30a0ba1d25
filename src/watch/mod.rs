// src/watch/mod.rs

//! Recursive filesystem watching with optional per-path debouncing.
//!
//! Data flow:
//!
//! ```text
//! registrar ──► WatchSource ──► EventStreams ──► dispatch loop ──► filter
//!                                                      │
//!                                       plain: callback │ dedup: Debouncer ──► callback
//! ```
//!
//! The source itself (`notify` in production) is an external collaborator;
//! everything from the streams onwards lives here.

pub mod debounce;
pub mod dispatch;
pub mod event;
pub mod filter;
pub mod options;
pub mod path_utils;
pub mod patterns;
pub mod registrar;
pub mod source;
pub mod watcher;

pub use debounce::{Debouncer, SharedCallback};
pub use dispatch::{StreamEnd, watch, watch_dedup};
pub use event::{ChangeKind, RawEvent};
pub use filter::{EventFilter, passes};
pub use options::{DEFAULT_DEBOUNCE, DEFAULT_IDLE_INTERVAL, WatchOptions};
pub use patterns::{PatternFilter, PatternSpec};
pub use registrar::add_recursive;
pub use source::{EventSenders, EventStreams, NotifySource, WatchSource, event_channel};
pub use watcher::Watcher;
