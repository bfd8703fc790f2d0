//! Bounded record of recent delayed admissions

use super::types::{DelayedEntry, HISTORY_CAPACITY};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Fixed-capacity ring buffer shared by all keys.
///
/// It has its own lock, independent of the per-key locks.
#[derive(Debug)]
pub(crate) struct DelayedHistory {
    entries: Mutex<VecDeque<DelayedEntry>>,
    capacity: usize,
}

impl Default for DelayedHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl DelayedHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when full
    pub fn push(&self, entry: DelayedEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Entries in insertion order, oldest first
    pub fn entries(&self) -> Vec<DelayedEntry> {
        self.entries.lock().iter().cloned().collect()
    }
}
