// src/watch/filter.rs

use std::fmt;
use std::sync::Arc;

use crate::watch::event::RawEvent;

/// Caller-supplied predicate deciding which raw events reach the callback.
///
/// Runs on the dispatch loop for every raw event, so it should be fast and
/// free of side effects.
#[derive(Clone)]
pub struct EventFilter(Arc<dyn Fn(&RawEvent) -> bool + Send + Sync>);

impl EventFilter {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&RawEvent) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn accepts(&self, event: &RawEvent) -> bool {
        (self.0)(event)
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventFilter").finish_non_exhaustive()
    }
}

/// An absent filter accepts everything.
pub fn passes(filter: Option<&EventFilter>, event: &RawEvent) -> bool {
    filter.is_none_or(|f| f.accepts(event))
}
