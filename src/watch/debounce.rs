// src/watch/debounce.rs

//! Per-path debouncing.
//!
//! Every path with pending events owns exactly one entry in a shared timer
//! table. The first event for a path arms a timer task; later events only move
//! the entry's deadline forward and replace its stored event. When a timer
//! task wakes up and finds its deadline reached, it removes the entry and runs
//! the callback with the last event seen for that path on Tokio's blocking
//! pool, so a slow callback never delays other paths.
//!
//! The table is touched from two sides: the dispatch loop (arming and
//! resetting) and the timer tasks (expiring). Both go through one mutex that
//! is only held for the table operation itself, never across a callback.
//!
//! A reset racing with an expiry either lands before the removal (and moves
//! the deadline, so the timer goes back to sleep) or after it (and arms a new
//! timer). A burst is therefore never reported twice and never lost.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace, warn};

use crate::logging::WatchLog;
use crate::types::ClosePolicy;
use crate::watch::event::RawEvent;

/// Callback shared between the debouncer and its timer tasks.
pub type SharedCallback = Arc<dyn Fn(RawEvent) + Send + Sync>;

struct PendingTimer {
    /// Distinguishes successive timers for the same path.
    id: u64,
    deadline: Instant,
    last: RawEvent,
    task: AbortHandle,
}

type TimerTable = HashMap<PathBuf, PendingTimer>;

/// Stand-in deadline for delays too large to add to `Instant::now()`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

fn lock_table(table: &Mutex<TimerTable>) -> MutexGuard<'_, TimerTable> {
    // Callbacks never run under the lock, so a poisoned table is still
    // consistent.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collapses bursts of events per path into one delayed callback.
///
/// Must be used from within a Tokio runtime: arming a timer spawns a task.
/// Dropping a `Debouncer` discards every pending timer.
pub struct Debouncer {
    delay: Duration,
    table: Arc<Mutex<TimerTable>>,
    callback: SharedCallback,
    log: Arc<dyn WatchLog>,
    next_id: u64,
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl Debouncer {
    pub fn new(delay: Duration, callback: SharedCallback, log: Arc<dyn WatchLog>) -> Self {
        Self {
            delay,
            table: Arc::new(Mutex::new(HashMap::new())),
            callback,
            log,
            next_id: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of paths with an armed timer.
    pub fn pending(&self) -> usize {
        lock_table(&self.table).len()
    }

    /// Record an event: arm a timer for its path, or restart the existing one.
    pub fn push(&mut self, event: RawEvent) {
        let deadline = deadline_after(self.delay);
        let mut table = lock_table(&self.table);

        if let Some(timer) = table.get_mut(&event.path) {
            trace!(path = ?event.path, "debounce timer reset");
            timer.deadline = deadline;
            timer.last = event;
            return;
        }

        let id = self.next_id;
        self.next_id += 1;

        let path = event.path.clone();
        let task = tokio::spawn(expire(
            Arc::clone(&self.table),
            path.clone(),
            id,
            deadline,
            Arc::clone(&self.callback),
            Arc::clone(&self.log),
        ));
        trace!(?path, id, "debounce timer armed");

        table.insert(
            path,
            PendingTimer {
                id,
                deadline,
                last: event,
                task: task.abort_handle(),
            },
        );
    }

    /// Stop all pending timers according to `policy`.
    ///
    /// With [`ClosePolicy::Flush`] every pending path gets its callback now,
    /// one after another in deadline order, and this only returns once the
    /// last of them has finished. Returns how many timers were pending.
    pub async fn close(mut self, policy: ClosePolicy) -> usize {
        let mut pending = self.drain();
        let count = pending.len();

        match policy {
            ClosePolicy::Discard => {
                if count > 0 {
                    debug!(count, "discarding pending debounce timers");
                }
            }
            ClosePolicy::Flush => {
                debug!(count, "flushing pending debounce timers");
                pending.sort_by_key(|timer| timer.deadline);
                for timer in pending {
                    self.log.fired(&timer.last);
                    run_callback(Arc::clone(&self.callback), timer.last).await;
                }
            }
        }

        count
    }

    /// Empty the table and cancel every timer task.
    fn drain(&mut self) -> Vec<PendingTimer> {
        let drained: Vec<PendingTimer> = lock_table(&self.table)
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in &drained {
            timer.task.abort();
        }
        drained
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.drain();
    }
}

/// Body of a timer task.
///
/// Sleeps until the entry's deadline; if the deadline moved meanwhile it
/// sleeps again. Exits silently when its entry is gone or belongs to a newer
/// timer.
async fn expire(
    table: Arc<Mutex<TimerTable>>,
    path: PathBuf,
    id: u64,
    mut deadline: Instant,
    callback: SharedCallback,
    log: Arc<dyn WatchLog>,
) {
    loop {
        sleep_until(deadline).await;

        let event = {
            let mut table = lock_table(&table);
            match table.get(&path) {
                Some(timer) if timer.id == id => {
                    if timer.deadline > Instant::now() {
                        deadline = timer.deadline;
                        continue;
                    }
                }
                _ => return,
            }
            match table.remove(&path) {
                Some(timer) => timer.last,
                None => return,
            }
        };

        log.fired(&event);
        run_callback(callback, event).await;
        return;
    }
}

/// Run a user callback on the blocking pool.
///
/// Callbacks may block; doing that on a runtime worker would stall every
/// other timer.
async fn run_callback(callback: SharedCallback, event: RawEvent) {
    let path = event.path.clone();
    if let Err(err) = tokio::task::spawn_blocking(move || callback(event)).await {
        warn!(?path, error = %err, "debounce callback failed");
    }
}
