// src/watch/source.rs

//! The watch-source seam.
//!
//! A watch source accepts directory registrations and delivers two streams:
//! change events and asynchronous errors. The production implementation is
//! backed by `notify`; tests provide their own source and drive the streams
//! directly through [`EventSenders`].

use std::fmt;
use std::path::Path;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::Result;
use crate::watch::event::RawEvent;

/// Something directories can be registered with.
///
/// Registration is non-recursive: changes to files directly inside a
/// registered directory are reported, subdirectories need their own
/// registration (see [`crate::watch::registrar::add_recursive`]).
pub trait WatchSource: Send {
    fn add(&mut self, path: &Path) -> Result<()>;
}

/// Receiving half of a watch source: events and errors.
///
/// Either stream reporting end-of-stream ends the watch loop.
#[derive(Debug)]
pub struct EventStreams {
    pub events: mpsc::UnboundedReceiver<RawEvent>,
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

/// Sending half matching [`EventStreams`].
#[derive(Debug, Clone)]
pub struct EventSenders {
    pub events: mpsc::UnboundedSender<RawEvent>,
    pub errors: mpsc::UnboundedSender<notify::Error>,
}

/// Create a connected sender/stream pair.
pub fn event_channel() -> (EventSenders, EventStreams) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (errors_tx, errors_rx) = mpsc::unbounded_channel();
    (
        EventSenders {
            events: events_tx,
            errors: errors_tx,
        },
        EventStreams {
            events: events_rx,
            errors: errors_rx,
        },
    )
}

/// Watch source backed by the platform's recommended `notify` watcher.
///
/// Dropping the source stops the underlying watcher and, with it, the sender
/// half of both streams.
pub struct NotifySource {
    inner: RecommendedWatcher,
}

impl fmt::Debug for NotifySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifySource").finish_non_exhaustive()
    }
}

impl NotifySource {
    pub fn new() -> Result<(Self, EventStreams)> {
        let (senders, streams) = event_channel();

        // Called synchronously on notify's own thread.
        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for raw in RawEvent::from_notify(event) {
                        if senders.events.send(raw).is_err() {
                            // Nobody is listening anymore.
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = senders.errors.send(err);
                }
            },
            Config::default(),
        )?;

        Ok((Self { inner }, streams))
    }
}

impl WatchSource for NotifySource {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.inner.watch(path, RecursiveMode::NonRecursive)?;
        debug!(?path, "notify watch added");
        Ok(())
    }
}
