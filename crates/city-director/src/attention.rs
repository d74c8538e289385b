//! Attention budget and focus allocation.
//!
//! Bounds the volume of narrative-eligible events surfaced per tick,
//! biased toward the player's focus ring. Events beyond the budget are
//! archived, never dropped, so the invariant
//! `ring_events + global_events + archived == raw events` holds every
//! tick.

use std::collections::BTreeSet;

use city_core::FocusState;
use city_events::{EventArchive, SimEvent};

use crate::config::DirectorConfig;

/// Result of allocating one tick's raw events against the budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    /// Surfaced events: ring picks first, then global, each pool ranked
    pub events: Vec<SimEvent>,
    pub ring_events: usize,
    pub global_events: usize,
    pub archived: usize,
    pub raw_events: usize,
}

/// Per-tick event backpressure.
#[derive(Debug, Clone)]
pub struct AttentionBudget {
    max_events_per_tick: usize,
}

impl AttentionBudget {
    pub fn new(config: &DirectorConfig) -> Self {
        Self {
            max_events_per_tick: config.max_events_per_tick,
        }
    }

    /// Allocates one tick's events. Overwrites the focus state's
    /// allocation counters and pushes overflow into the archive.
    pub fn allocate(
        &self,
        events: Vec<SimEvent>,
        focus: &mut FocusState,
        archive: &mut EventArchive,
    ) -> Digest {
        let raw_events = events.len();
        let ring_ids: BTreeSet<&str> = focus.ring().into_iter().collect();

        // Partition preserving generation order; no focus means the ring
        // set is empty and everything classifies as global.
        let mut ring: Vec<SimEvent> = Vec::new();
        let mut global: Vec<SimEvent> = Vec::new();
        for event in events {
            let in_ring = event
                .district
                .as_deref()
                .is_some_and(|d| ring_ids.contains(d));
            if in_ring {
                ring.push(event);
            } else {
                global.push(event);
            }
        }

        // Rank inside each pool: severity descending; the stable sort keeps
        // generation order as the tie-break. Never random.
        let rank = |pool: &mut Vec<SimEvent>| {
            pool.sort_by(|a, b| b.severity.total_cmp(&a.severity));
        };
        rank(&mut ring);
        rank(&mut global);

        let budget = self.max_events_per_tick;
        let ring_events = ring.len().min(budget);
        let global_events = global.len().min(budget - ring_events);

        let mut selected = Vec::with_capacity(ring_events + global_events);
        let mut overflow = Vec::new();

        let mut ring_iter = ring.into_iter();
        selected.extend(ring_iter.by_ref().take(ring_events));
        overflow.extend(ring_iter);
        let mut global_iter = global.into_iter();
        selected.extend(global_iter.by_ref().take(global_events));
        overflow.extend(global_iter);

        for event in overflow {
            archive.push(event);
        }

        let archived = raw_events - ring_events - global_events;
        focus.ring_events = ring_events;
        focus.global_events = global_events;
        focus.archived = archived;

        tracing::debug!(raw_events, ring_events, global_events, archived, "attention allocated");

        Digest {
            events: selected,
            ring_events,
            global_events,
            archived,
            raw_events,
        }
    }
}
