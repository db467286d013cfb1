// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized tables and the operations that mutate them

use chrono::{DateTime, Utc};
use roster_core::{
    OccurrenceId, Registration, RegistrationState, ScheduleId, ShiftOccurrence, ShiftSchedule,
    UserId, UserProfile,
};
use std::collections::HashMap;

/// Staged mutation applied atomically at commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Create or flip the (user, occurrence) registration row
    UpsertRegistration {
        user_id: UserId,
        occurrence_id: OccurrenceId,
        state: RegistrationState,
        at: DateTime<Utc>,
    },
    /// Write the cached availability counter
    SetAvailableSlots {
        occurrence_id: OccurrenceId,
        available_slots: u32,
    },
}

/// The materialized row tables
#[derive(Debug, Default)]
pub struct Tables {
    pub occurrences: HashMap<OccurrenceId, ShiftOccurrence>,
    pub schedules: HashMap<ScheduleId, ShiftSchedule>,
    pub users: HashMap<UserId, UserProfile>,
    pub registrations: HashMap<(UserId, OccurrenceId), Registration>,
}

impl Tables {
    /// Apply an operation to update the tables
    pub fn apply(&mut self, op: &StoreOp) {
        match op {
            StoreOp::UpsertRegistration {
                user_id,
                occurrence_id,
                state,
                at,
            } => {
                self.registrations
                    .entry((*user_id, *occurrence_id))
                    .and_modify(|row| {
                        row.state = *state;
                        row.updated_at = *at;
                    })
                    .or_insert_with(|| Registration {
                        user_id: *user_id,
                        occurrence_id: *occurrence_id,
                        state: *state,
                        created_at: *at,
                        updated_at: *at,
                    });
            }

            StoreOp::SetAvailableSlots {
                occurrence_id,
                available_slots,
            } => {
                if let Some(occurrence) = self.occurrences.get_mut(occurrence_id) {
                    occurrence.available_slots = *available_slots;
                }
            }
        }
    }

    /// Count active registrations for one occurrence
    pub fn active_count(&self, occurrence_id: OccurrenceId) -> u32 {
        self.registrations
            .values()
            .filter(|row| {
                row.occurrence_id == occurrence_id && row.state == RegistrationState::Active
            })
            .count() as u32
    }

    /// Active registrants for one occurrence, sorted by user id
    pub fn roster(&self, occurrence_id: OccurrenceId) -> Vec<UserProfile> {
        let mut users: Vec<UserProfile> = self
            .registrations
            .values()
            .filter(|row| {
                row.occurrence_id == occurrence_id && row.state == RegistrationState::Active
            })
            .filter_map(|row| self.users.get(&row.user_id).cloned())
            .collect();
        users.sort_by_key(|user| user.id);
        users
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
