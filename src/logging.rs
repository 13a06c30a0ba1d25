// src/logging.rs

//! Logging for `treewatch`.
//!
//! Two layers:
//! - [`init_logging`] installs the global `tracing-subscriber` used by the
//!   binary.
//! - [`WatchLog`] is the collaborator the watch core reports through. The
//!   default [`TracingLog`] forwards to `tracing`; tests inject a recorder so
//!   output from timer tasks and the dispatch loop can be asserted on.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `TREEWATCH_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout carries only the event stream.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;
use crate::errors::TreewatchError;
use crate::watch::event::RawEvent;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("TREEWATCH_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

/// Diagnostics emitted by the registrar, the dispatch loop and debounce
/// timers.
///
/// Implementations must be cheap and must not block: `fired` is called from
/// timer tasks and everything else from the dispatch loop.
pub trait WatchLog: Send + Sync + Debug {
    /// A directory was registered with the watch source.
    fn registered(&self, path: &Path);

    /// A directory could not be registered and was skipped.
    fn registration_failed(&self, path: &Path, err: &TreewatchError);

    /// The watch source reported an error. Never fatal.
    fn upstream_error(&self, err: &notify::Error);

    /// No event or error arrived within `interval`.
    fn idle(&self, interval: Duration);

    /// A debounce timer expired and its callback is about to run.
    fn fired(&self, event: &RawEvent);
}

/// [`WatchLog`] that writes through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl WatchLog for TracingLog {
    fn registered(&self, path: &Path) {
        info!(?path, "watching path");
    }

    fn registration_failed(&self, path: &Path, err: &TreewatchError) {
        error!(?path, error = %err, "error adding path; skipping");
    }

    fn upstream_error(&self, err: &notify::Error) {
        warn!(error = %err, "watch source error");
    }

    fn idle(&self, interval: Duration) {
        debug!(?interval, "no events..");
    }

    fn fired(&self, event: &RawEvent) {
        debug!(path = ?event.path, kind = %event.kind, "debounce timer fired");
    }
}
