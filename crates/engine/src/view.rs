// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side occupancy cache
//!
//! `PeriodView` is the reference consumer of a delta stream: prime it from
//! one `occupancy` snapshot, then apply deltas as they arrive. Because
//! every delta carries the full resulting roster and counts, apply is a
//! wholesale replacement of that occurrence's entry; a view that missed
//! events converges again on the very next delta.

use std::collections::HashMap;

use roster_core::{DeltaEvent, OccurrenceId, PeriodId};

use crate::engine::OccurrenceSnapshot;

/// Locally cached occupancy for one period
#[derive(Debug, Clone)]
pub struct PeriodView {
    period_id: PeriodId,
    occurrences: HashMap<OccurrenceId, OccurrenceSnapshot>,
}

impl PeriodView {
    pub fn new(period_id: PeriodId) -> Self {
        Self {
            period_id,
            occurrences: HashMap::new(),
        }
    }

    /// Replace the whole view with a fresh full read
    pub fn prime(&mut self, snapshot: Vec<OccurrenceSnapshot>) {
        self.occurrences = snapshot
            .into_iter()
            .map(|entry| (entry.occurrence_id, entry))
            .collect();
    }

    /// Apply one delta, replacing that occurrence's entry wholesale
    ///
    /// Deltas for other periods are ignored. An occurrence this view has
    /// never seen is inserted, so a view can build itself from the stream
    /// alone.
    pub fn apply(&mut self, event: &DeltaEvent) {
        if event.period_id != self.period_id {
            return;
        }
        self.occurrences.insert(
            event.occurrence_id,
            OccurrenceSnapshot {
                occurrence_id: event.occurrence_id,
                period_id: event.period_id,
                available_slots: event.available_slots,
                total_slots: event.total_slots,
                roster: event.roster.clone(),
            },
        );
    }

    pub fn occurrence(&self, id: OccurrenceId) -> Option<&OccurrenceSnapshot> {
        self.occurrences.get(&id)
    }

    pub fn available_slots(&self, id: OccurrenceId) -> Option<u32> {
        self.occurrences.get(&id).map(|entry| entry.available_slots)
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}
