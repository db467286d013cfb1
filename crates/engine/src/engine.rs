// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration engine
//!
//! One registration operation is: acquire row locks in the coordinator's
//! global order, re-derive the capacity ledger from the active count,
//! consult the transition table, stage the writes, commit, publish deltas,
//! release the locks. Everything after acquisition is synchronous, so a
//! caller cancelled mid-operation can never leave a half-applied
//! transaction behind.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use roster_core::{
    Clock, Decision, DeltaBus, DeltaEvent, DeltaKind, LedgerError, OccurrenceId, PeriodId,
    RegistrationInput, RegistrationStatus, RosterUser, ScheduleId, SlotEffect, SlotLedger,
    SystemClock, UserId, UserProfile,
};
use roster_storage::{Store, Transaction};

use crate::config::EngineConfig;
use crate::coordinator::{LockCoordinator, LockSet};
use crate::error::EngineError;
use crate::subscription::DeltaStream;

/// Slot counts after a successful operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCounts {
    pub available_slots: u32,
    pub total_slots: u32,
}

/// Full per-occurrence state, the reconnect refetch payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceSnapshot {
    pub occurrence_id: OccurrenceId,
    pub period_id: PeriodId,
    pub available_slots: u32,
    pub total_slots: u32,
    pub roster: Vec<RosterUser>,
}

/// Orchestrates registration transactions over the store and the delta bus
pub struct RegistrationEngine<C: Clock = SystemClock> {
    store: Store,
    bus: DeltaBus,
    coordinator: LockCoordinator,
    clock: C,
    config: EngineConfig,
}

impl<C: Clock> RegistrationEngine<C> {
    /// Create an engine owning a fresh bus sized from the config
    pub fn new(store: Store, clock: C, config: EngineConfig) -> Self {
        let bus = DeltaBus::with_buffer(config.subscriber_buffer);
        Self::with_bus(store, bus, clock, config)
    }

    /// Create an engine publishing to an existing bus
    ///
    /// The bus keeps its own buffer size; `config.subscriber_buffer` is not
    /// applied to it.
    pub fn with_bus(store: Store, bus: DeltaBus, clock: C, config: EngineConfig) -> Self {
        let coordinator = LockCoordinator::new(store.clone());
        Self {
            store,
            bus,
            coordinator,
            clock,
            config,
        }
    }

    /// Handle on the shared delta bus
    pub fn bus(&self) -> DeltaBus {
        self.bus.clone()
    }

    /// Register a user for an occurrence
    ///
    /// Idempotent: registering while already active succeeds without
    /// consuming capacity or publishing a delta.
    pub async fn register(
        &self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let span = tracing::info_span!("register", user = %user_id, occurrence = %occurrence_id);
        async {
            let start = std::time::Instant::now();
            let result = self.register_inner(user_id, occurrence_id).await;
            Self::trace_outcome(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    /// Cancel a user's registration for an occurrence
    ///
    /// Idempotent: unregistering while not active succeeds without
    /// publishing a delta.
    pub async fn unregister(
        &self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let span =
            tracing::info_span!("unregister", user = %user_id, occurrence = %occurrence_id);
        async {
            let start = std::time::Instant::now();
            let result = self.unregister_inner(user_id, occurrence_id).await;
            Self::trace_outcome(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    /// Move a user from one occurrence to another, all-or-nothing
    ///
    /// Both occurrences are locked up front; a rejection on the target
    /// (capacity, window) leaves the source registration untouched.
    /// Returns the target's counts.
    pub async fn switch(
        &self,
        user_id: UserId,
        from: OccurrenceId,
        to: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let span = tracing::info_span!("switch", user = %user_id, from = %from, to = %to);
        async {
            let start = std::time::Instant::now();
            let result = self.switch_inner(user_id, from, to).await;
            Self::trace_outcome(&result, start.elapsed());
            result
        }
        .instrument(span)
        .await
    }

    /// Open a delta stream for one period
    pub fn subscribe(&self, period_id: PeriodId) -> DeltaStream {
        DeltaStream::open(&self.bus, period_id)
    }

    /// Full state of every occurrence in a period
    ///
    /// This is the read a client performs once on (re)connect before
    /// resuming its delta stream. Counts are derived from the registration
    /// rows, not the cached counter.
    pub fn occupancy(&self, period_id: PeriodId) -> Vec<OccurrenceSnapshot> {
        self.store
            .occurrences_in_period(period_id)
            .into_iter()
            .map(|occ| {
                let roster: Vec<RosterUser> = self
                    .store
                    .roster(occ.id)
                    .iter()
                    .map(RosterUser::from)
                    .collect();
                let available_slots = occ.total_slots.saturating_sub(roster.len() as u32);
                OccurrenceSnapshot {
                    occurrence_id: occ.id,
                    period_id,
                    available_slots,
                    total_slots: occ.total_slots,
                    roster,
                }
            })
            .collect()
    }

    // --- Transaction bodies ---

    async fn register_inner(
        &self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let user = self
            .store
            .user(user_id)
            .ok_or(EngineError::UserNotFound(user_id))?;
        let occurrence = self
            .store
            .occurrence(occurrence_id)
            .ok_or(EngineError::OccurrenceNotFound(occurrence_id))?;

        let locks = self
            .acquire(&[occurrence.schedule_id], &[occurrence_id])
            .await?;

        let now = self.clock.now();
        let mut txn = self.store.begin();
        let mut deltas = Vec::new();
        let counts = self.stage_transition(
            &mut txn,
            &user,
            occurrence_id,
            RegistrationInput::Register,
            now,
            &mut deltas,
        )?;

        self.commit_and_publish(txn, &deltas);
        drop(locks);
        Ok(counts)
    }

    async fn unregister_inner(
        &self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let user = self
            .store
            .user(user_id)
            .ok_or(EngineError::UserNotFound(user_id))?;
        let occurrence = self
            .store
            .occurrence(occurrence_id)
            .ok_or(EngineError::OccurrenceNotFound(occurrence_id))?;

        let locks = self
            .acquire(&[occurrence.schedule_id], &[occurrence_id])
            .await?;

        let now = self.clock.now();
        let mut txn = self.store.begin();
        let mut deltas = Vec::new();
        let counts = self.stage_transition(
            &mut txn,
            &user,
            occurrence_id,
            RegistrationInput::Unregister,
            now,
            &mut deltas,
        )?;

        self.commit_and_publish(txn, &deltas);
        drop(locks);
        Ok(counts)
    }

    async fn switch_inner(
        &self,
        user_id: UserId,
        from: OccurrenceId,
        to: OccurrenceId,
    ) -> Result<SlotCounts, EngineError> {
        let user = self
            .store
            .user(user_id)
            .ok_or(EngineError::UserNotFound(user_id))?;
        let from_occ = self
            .store
            .occurrence(from)
            .ok_or(EngineError::OccurrenceNotFound(from))?;
        let to_occ = self
            .store
            .occurrence(to)
            .ok_or(EngineError::OccurrenceNotFound(to))?;

        // Switching to the same occurrence changes nothing
        if from == to {
            let locks = self.acquire(&[to_occ.schedule_id], &[to]).await?;
            let active = self.store.active_count(to);
            let ledger = Self::derive_ledger(to, to_occ.total_slots, active)?;
            drop(locks);
            return Ok(SlotCounts {
                available_slots: ledger.available_slots(),
                total_slots: ledger.total_slots(),
            });
        }

        let locks = self
            .acquire(
                &[from_occ.schedule_id, to_occ.schedule_id],
                &[from, to],
            )
            .await?;

        let now = self.clock.now();
        let mut txn = self.store.begin();
        let mut deltas = Vec::new();

        // Target first so a full shift rejects before anything is staged
        let counts = self.stage_transition(
            &mut txn,
            &user,
            to,
            RegistrationInput::Register,
            now,
            &mut deltas,
        )?;
        self.stage_transition(
            &mut txn,
            &user,
            from,
            RegistrationInput::Unregister,
            now,
            &mut deltas,
        )?;

        self.commit_and_publish(txn, &deltas);
        drop(locks);
        Ok(counts)
    }

    // --- Critical-section helpers (no awaits past this point) ---

    /// Acquire the lock set under the configured deadline
    async fn acquire(
        &self,
        schedules: &[ScheduleId],
        occurrences: &[OccurrenceId],
    ) -> Result<LockSet, EngineError> {
        match tokio::time::timeout(
            self.config.lock_timeout,
            self.coordinator.lock(schedules, occurrences),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(EngineError::LockTimeout),
        }
    }

    /// Validate and stage one transition; locks must already be held
    fn stage_transition(
        &self,
        txn: &mut Transaction<'_>,
        user: &UserProfile,
        occurrence_id: OccurrenceId,
        input: RegistrationInput,
        now: DateTime<Utc>,
        deltas: &mut Vec<DeltaEvent>,
    ) -> Result<SlotCounts, EngineError> {
        let occurrence = self
            .store
            .occurrence(occurrence_id)
            .ok_or(EngineError::OccurrenceNotFound(occurrence_id))?;

        if input == RegistrationInput::Register {
            let schedule = self
                .store
                .schedule(occurrence.schedule_id)
                .ok_or(EngineError::ScheduleNotFound(occurrence.schedule_id))?;
            if !schedule.registration_open_at(now) {
                return Err(EngineError::RegistrationClosed(schedule.id));
            }
        }

        let active = self.store.active_count(occurrence_id);
        let ledger = Self::derive_ledger(occurrence_id, occurrence.total_slots, active)?;

        if occurrence.available_slots != ledger.available_slots() {
            tracing::warn!(
                occurrence = %occurrence_id,
                cached = occurrence.available_slots,
                derived = ledger.available_slots(),
                "cached availability drifted, repairing"
            );
        }

        let status =
            RegistrationStatus::from_row(self.store.registration_state(user.id, occurrence_id));

        match status.transition(input) {
            Decision::NoOp => Ok(SlotCounts {
                available_slots: ledger.available_slots(),
                total_slots: ledger.total_slots(),
            }),
            Decision::Apply { state, slot } => {
                let next = match slot {
                    SlotEffect::Reserve => ledger.reserve().map_err(|e| match e {
                        LedgerError::Exhausted { total_slots } => EngineError::CapacityExceeded {
                            occurrence: occurrence_id,
                            total_slots,
                        },
                        other => Self::invariant(occurrence_id, other),
                    })?,
                    SlotEffect::Release => ledger
                        .release()
                        .map_err(|e| Self::invariant(occurrence_id, e))?,
                };

                txn.upsert_registration(user.id, occurrence_id, state, now);
                txn.set_available_slots(occurrence_id, next.available_slots());

                let mut roster: Vec<RosterUser> = self
                    .store
                    .roster(occurrence_id)
                    .iter()
                    .map(RosterUser::from)
                    .collect();
                match slot {
                    SlotEffect::Reserve => {
                        roster.push(RosterUser::from(user));
                        roster.sort_by_key(|entry| entry.id);
                    }
                    SlotEffect::Release => roster.retain(|entry| entry.id != user.id),
                }

                let kind = match slot {
                    SlotEffect::Reserve => DeltaKind::Register,
                    SlotEffect::Release => DeltaKind::Unregister,
                };
                let event = DeltaEvent {
                    kind,
                    occurrence_id,
                    period_id: occurrence.period_id,
                    user: RosterUser::from(user),
                    available_slots: next.available_slots(),
                    total_slots: next.total_slots(),
                    roster,
                    timestamp: now,
                };
                if !event.counts_match_roster() {
                    return Err(Self::invariant(
                        occurrence_id,
                        LedgerError::ActiveExceedsCapacity {
                            total_slots: next.total_slots(),
                            active: event.roster.len() as u32,
                        },
                    ));
                }
                deltas.push(event);

                Ok(SlotCounts {
                    available_slots: next.available_slots(),
                    total_slots: next.total_slots(),
                })
            }
        }
    }

    /// Commit staged writes, then publish while still holding the locks
    fn commit_and_publish(&self, txn: Transaction<'_>, deltas: &[DeltaEvent]) {
        txn.commit();
        for event in deltas {
            self.bus.publish(event);
        }
    }

    fn derive_ledger(
        occurrence_id: OccurrenceId,
        total_slots: u32,
        active: u32,
    ) -> Result<SlotLedger, EngineError> {
        SlotLedger::derive(total_slots, active).map_err(|e| Self::invariant(occurrence_id, e))
    }

    fn invariant(occurrence_id: OccurrenceId, source: LedgerError) -> EngineError {
        tracing::error!(occurrence = %occurrence_id, error = %source, "ledger invariant violated");
        EngineError::InvariantViolation(source.to_string())
    }

    fn trace_outcome(result: &Result<SlotCounts, EngineError>, elapsed: Duration) {
        match result {
            Ok(counts) => tracing::info!(
                elapsed_ms = elapsed.as_millis() as u64,
                available = counts.available_slots,
                total = counts.total_slots,
                "completed"
            ),
            Err(e @ EngineError::InvariantViolation(_)) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "failed"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "rejected"
            ),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
