// src/watch/watcher.rs

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::dispatch::{self, StreamEnd};
use crate::watch::event::RawEvent;
use crate::watch::options::WatchOptions;
use crate::watch::registrar;
use crate::watch::source::{EventStreams, NotifySource, WatchSource};

/// A watch source together with its streams and the options used to drive
/// them.
///
/// The source stays alive for as long as the `Watcher` (or the future
/// returned by [`Watcher::watch`] / [`Watcher::watch_dedup`]) does. Use
/// [`Watcher::into_parts`] to keep the source separately and end the loop by
/// dropping it.
pub struct Watcher<S: WatchSource = NotifySource> {
    source: S,
    streams: EventStreams,
    options: WatchOptions,
}

impl<S: WatchSource> fmt::Debug for Watcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Watcher<NotifySource> {
    /// Create a watcher backed by the platform's `notify` backend.
    pub fn new(options: WatchOptions) -> Result<Self> {
        let (source, streams) = NotifySource::new()?;
        Ok(Self::from_parts(source, streams, options))
    }
}

impl<S: WatchSource> Watcher<S> {
    pub fn from_parts(source: S, streams: EventStreams, options: WatchOptions) -> Self {
        Self {
            source,
            streams,
            options,
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Register `root` and all directories below it.
    pub fn add_recursive(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        self.add_recursive_with(&RealFileSystem, root)
    }

    /// Like [`Watcher::add_recursive`], walking the tree through `fs`.
    pub fn add_recursive_with(
        &mut self,
        fs: &dyn FileSystem,
        root: impl AsRef<Path>,
    ) -> Result<usize> {
        let root = root.as_ref();
        let count = registrar::add_recursive(&mut self.source, fs, root, self.options.log.as_ref())?;
        info!(?root, count, "registered directory tree");
        Ok(count)
    }

    /// Run the plain dispatch loop until a stream closes.
    pub async fn watch<F>(self, callback: F) -> StreamEnd
    where
        F: FnMut(RawEvent),
    {
        let Self {
            source,
            streams,
            options,
        } = self;
        let end = dispatch::watch(streams, &options, callback).await;
        drop(source);
        end
    }

    /// Run the debounced dispatch loop until a stream closes.
    pub async fn watch_dedup<F>(self, callback: F) -> StreamEnd
    where
        F: Fn(RawEvent) + Send + Sync + 'static,
    {
        let Self {
            source,
            streams,
            options,
        } = self;
        let end = dispatch::watch_dedup(streams, &options, callback).await;
        drop(source);
        end
    }

    /// Split into source, streams and options.
    pub fn into_parts(self) -> (S, EventStreams, WatchOptions) {
        (self.source, self.streams, self.options)
    }
}
