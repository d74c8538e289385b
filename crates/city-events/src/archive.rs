//! Bounded event archive.
//!
//! Events that do not fit the per-tick attention budget are never dropped:
//! they land here. The archive keeps two bounded views, a most-recent window
//! and a top-K by severity, both queryable by UI digests and the
//! explanations layer.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::event::SimEvent;

/// Bounded archive of events that missed the per-tick digest budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventArchive {
    recent: VecDeque<SimEvent>,
    top: Vec<SimEvent>,
    recent_cap: usize,
    top_cap: usize,
    /// Total events ever archived, across evictions
    total_archived: u64,
}

impl EventArchive {
    /// Creates an archive with the given window caps.
    pub fn new(recent_cap: usize, top_cap: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(recent_cap),
            top: Vec::with_capacity(top_cap.saturating_add(1)),
            recent_cap,
            top_cap,
            total_archived: 0,
        }
    }

    /// Archives one event, evicting the oldest from the recent window and
    /// the weakest from the top-K ranking as needed.
    pub fn push(&mut self, event: SimEvent) {
        self.total_archived += 1;

        self.recent.push_back(event.clone());
        while self.recent.len() > self.recent_cap {
            self.recent.pop_front();
        }

        self.top.push(event);
        // Severity descending, event id ascending as the deterministic tie-break.
        self.top.sort_by(|a, b| {
            b.severity
                .total_cmp(&a.severity)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        self.top.truncate(self.top_cap);
    }

    /// Most recently archived events, newest last, capped at `count`.
    pub fn recent(&self, count: usize) -> Vec<&SimEvent> {
        let skip = self.recent.len().saturating_sub(count);
        self.recent.iter().skip(skip).collect()
    }

    /// Highest-severity archived events, capped at `count`.
    pub fn top(&self, count: usize) -> Vec<&SimEvent> {
        self.top.iter().take(count).collect()
    }

    /// Number of events currently held in the recent window.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Total events ever archived, including evicted ones.
    pub fn total_archived(&self) -> u64 {
        self.total_archived
    }
}

impl Default for EventArchive {
    fn default() -> Self {
        Self::new(64, 16)
    }
}
