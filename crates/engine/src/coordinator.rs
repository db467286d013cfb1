// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlock-safe multi-row lock acquisition
//!
//! Every operation locks its rows through this coordinator, which imposes
//! one global order: schedules before occurrences, each kind ascending by
//! id. Identifier sets are deduplicated, so requesting a row twice holds
//! it once. Guards are collected into a `LockSet` that releases everything
//! on drop, whichever way the transaction exits.

use std::collections::BTreeSet;

use roster_core::{OccurrenceId, ScheduleId};
use roster_storage::{RowGuard, Store};

use crate::error::EngineError;

/// Exclusive hold on a set of rows for one transaction
///
/// Dropping the set releases every guard.
#[derive(Debug)]
pub struct LockSet {
    guards: Vec<RowGuard>,
}

impl LockSet {
    /// Number of rows held
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

/// Acquires row locks in the global order
pub struct LockCoordinator {
    store: Store,
}

impl LockCoordinator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Lock the given schedules and occurrences
    ///
    /// Blocks until every lock is granted; deadline enforcement belongs to
    /// the caller. A missing row aborts with `NotFound` and releases any
    /// guards already held. Empty inputs succeed with an empty set.
    pub async fn lock(
        &self,
        schedules: &[ScheduleId],
        occurrences: &[OccurrenceId],
    ) -> Result<LockSet, EngineError> {
        let mut guards = Vec::with_capacity(schedules.len() + occurrences.len());

        // BTreeSet dedupes and yields ascending order
        let schedule_ids: BTreeSet<ScheduleId> = schedules.iter().copied().collect();
        for id in schedule_ids {
            match self.store.lock_schedule(id).await {
                Some(guard) => guards.push(guard),
                None => return Err(EngineError::ScheduleNotFound(id)),
            }
        }

        let occurrence_ids: BTreeSet<OccurrenceId> = occurrences.iter().copied().collect();
        for id in occurrence_ids {
            match self.store.lock_occurrence(id).await {
                Some(guard) => guards.push(guard),
                None => return Err(EngineError::OccurrenceNotFound(id)),
            }
        }

        Ok(LockSet { guards })
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
