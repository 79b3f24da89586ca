//! The deferred-effect queue.
//!
//! Items pushed while the scheduler is draining land in the fresh queue and
//! run on the next tick, never the current one.

use huum_core::{EventId, SimTime};

/// A fired effect waiting to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QueueItem {
    pub event:      EventId,
    /// Index into the event's effects.
    pub effect:     usize,
    /// Deferred timestamp, e.g. an appliance's blocked-until.
    pub time_start: Option<SimTime>,
}

#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    items: Vec<QueueItem>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// Swap the live queue for an empty one and return what was in it.
    pub fn take(&mut self) -> Vec<QueueItem> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
