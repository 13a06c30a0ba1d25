// src/watch/options.rs

use std::sync::Arc;
use std::time::Duration;

use crate::logging::{TracingLog, WatchLog};
use crate::types::ClosePolicy;
use crate::watch::filter::EventFilter;

/// Default quiet period for debounced watching.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Default interval after which the dispatch loop reports inactivity.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(2);

/// Settings shared by plain and debounced watching.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Quiet period a path must go without events before its debounced
    /// callback fires. Only used by debounced watching.
    pub debounce: Duration,

    /// Predicate applied to every raw event before dispatch. `None` accepts
    /// everything.
    pub filter: Option<EventFilter>,

    /// How long the loop waits for an event or error before logging
    /// inactivity. Must be non-zero.
    pub idle_interval: Duration,

    /// Fate of still-armed debounce timers when a stream closes.
    pub on_close: ClosePolicy,

    /// Where diagnostics go.
    pub log: Arc<dyn WatchLog>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            filter: None,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            on_close: ClosePolicy::default(),
            log: Arc::new(TracingLog),
        }
    }
}

impl WatchOptions {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    pub fn with_on_close(mut self, policy: ClosePolicy) -> Self {
        self.on_close = policy;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn WatchLog>) -> Self {
        self.log = log;
        self
    }
}
