// src/watch/dispatch.rs

//! The dispatch loop.
//!
//! One task reads both streams of a watch source and multiplexes them with an
//! idle timer:
//! - event ready: run the filter, then hand the event on
//! - error ready: log it and keep going
//! - idle timer fired: log inactivity and keep going
//!
//! Whichever source is ready gets serviced; there is no fairness between them
//! beyond every ready source being serviced eventually. The loop ends as soon
//! as either stream reports end-of-stream.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, trace};

use crate::watch::debounce::Debouncer;
use crate::watch::event::RawEvent;
use crate::watch::filter::passes;
use crate::watch::options::WatchOptions;
use crate::watch::source::EventStreams;

/// Smallest idle interval the loop will use; a zero interval would spin.
const MIN_IDLE_INTERVAL: Duration = Duration::from_millis(1);

/// Which stream ended the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    Events,
    Errors,
}

/// Plain watching: invoke `callback` synchronously for every accepted event.
///
/// While the callback runs no further events are drained, so a slow callback
/// holds up the whole watcher.
pub async fn watch<F>(mut streams: EventStreams, options: &WatchOptions, mut callback: F) -> StreamEnd
where
    F: FnMut(RawEvent),
{
    drive(&mut streams, options, |event| callback(event)).await
}

/// Debounced watching: invoke `callback` once per burst of accepted events
/// on the same path, `options.debounce` after the last event of the burst,
/// with that last event.
///
/// Callbacks run on the blocking pool, possibly concurrently for different
/// paths.
/// When the loop ends, still-armed timers are handled per
/// `options.on_close`.
pub async fn watch_dedup<F>(mut streams: EventStreams, options: &WatchOptions, callback: F) -> StreamEnd
where
    F: Fn(RawEvent) + Send + Sync + 'static,
{
    let mut debouncer = Debouncer::new(
        options.debounce,
        Arc::new(callback),
        Arc::clone(&options.log),
    );

    let end = drive(&mut streams, options, |event| debouncer.push(event)).await;

    let pending = debouncer.close(options.on_close).await;
    info!(?end, pending, on_close = ?options.on_close, "debounced watch loop finished");
    end
}

async fn drive<H>(streams: &mut EventStreams, options: &WatchOptions, mut handle: H) -> StreamEnd
where
    H: FnMut(RawEvent),
{
    let idle = options.idle_interval.max(MIN_IDLE_INTERVAL);

    loop {
        tokio::select! {
            maybe_event = streams.events.recv() => match maybe_event {
                Some(event) => {
                    if passes(options.filter.as_ref(), &event) {
                        handle(event);
                    } else {
                        trace!(%event, "event rejected by filter");
                    }
                }
                None => {
                    info!("event stream closed; stopping watch loop");
                    return StreamEnd::Events;
                }
            },
            maybe_err = streams.errors.recv() => match maybe_err {
                Some(err) => options.log.upstream_error(&err),
                None => {
                    info!("error stream closed; stopping watch loop");
                    return StreamEnd::Errors;
                }
            },
            _ = tokio::time::sleep(idle) => options.log.idle(idle),
        }
    }
}
