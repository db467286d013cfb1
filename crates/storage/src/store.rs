// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory transactional row store
//!
//! Tables live behind one `RwLock`; every row that can be contended carries
//! its own async lock word, handed out as an owned guard so callers can
//! hold it across await points. Writes are staged on a `Transaction` and
//! applied in a single critical section at commit; dropping an uncommitted
//! transaction discards its staged operations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use roster_core::{
    OccurrenceId, PeriodId, RegistrationState, ScheduleId, ShiftOccurrence, ShiftSchedule,
    UserId, UserProfile,
};

use crate::state::{StoreOp, Tables};

/// Errors that can occur seeding the store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("occurrence {0} already exists")]
    DuplicateOccurrence(OccurrenceId),
    #[error("schedule {0} already exists")]
    DuplicateSchedule(ScheduleId),
    #[error("user {0} already exists")]
    DuplicateUser(UserId),
    #[error("occurrence {occurrence} references unknown schedule {schedule}")]
    UnknownSchedule {
        occurrence: OccurrenceId,
        schedule: ScheduleId,
    },
}

/// Exclusive hold on one row
pub type RowGuard = OwnedMutexGuard<()>;

type LockWord = Arc<Mutex<()>>;

/// The shared row store
pub struct Store {
    tables: Arc<RwLock<Tables>>,
    occurrence_locks: Arc<RwLock<HashMap<OccurrenceId, LockWord>>>,
    schedule_locks: Arc<RwLock<HashMap<ScheduleId, LockWord>>>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            occurrence_locks: Arc::new(RwLock::new(HashMap::new())),
            schedule_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // --- Seeding (host application CRUD boundary) ---

    pub fn insert_schedule(&self, schedule: ShiftSchedule) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.schedules.contains_key(&schedule.id) {
            return Err(StoreError::DuplicateSchedule(schedule.id));
        }
        let mut locks = self
            .schedule_locks
            .write()
            .unwrap_or_else(|e| e.into_inner());
        locks.insert(schedule.id, Arc::new(Mutex::new(())));
        tables.schedules.insert(schedule.id, schedule);
        Ok(())
    }

    pub fn insert_occurrence(&self, occurrence: ShiftOccurrence) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.occurrences.contains_key(&occurrence.id) {
            return Err(StoreError::DuplicateOccurrence(occurrence.id));
        }
        if !tables.schedules.contains_key(&occurrence.schedule_id) {
            return Err(StoreError::UnknownSchedule {
                occurrence: occurrence.id,
                schedule: occurrence.schedule_id,
            });
        }
        let mut locks = self
            .occurrence_locks
            .write()
            .unwrap_or_else(|e| e.into_inner());
        locks.insert(occurrence.id, Arc::new(Mutex::new(())));
        tables.occurrences.insert(occurrence.id, occurrence);
        Ok(())
    }

    pub fn insert_user(&self, user: UserProfile) -> Result<(), StoreError> {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::DuplicateUser(user.id));
        }
        tables.users.insert(user.id, user);
        Ok(())
    }

    // --- Row locks ---

    /// Acquire the exclusive lock for one occurrence row
    ///
    /// Returns `None` when no such row exists; the caller decides whether
    /// fewer rows locked than requested aborts the operation.
    pub async fn lock_occurrence(&self, id: OccurrenceId) -> Option<RowGuard> {
        let word = {
            let locks = self
                .occurrence_locks
                .read()
                .unwrap_or_else(|e| e.into_inner());
            locks.get(&id).cloned()
        }?;
        Some(word.lock_owned().await)
    }

    /// Acquire the exclusive lock for one schedule row
    pub async fn lock_schedule(&self, id: ScheduleId) -> Option<RowGuard> {
        let word = {
            let locks = self
                .schedule_locks
                .read()
                .unwrap_or_else(|e| e.into_inner());
            locks.get(&id).cloned()
        }?;
        Some(word.lock_owned().await)
    }

    // --- Reads ---

    pub fn occurrence(&self, id: OccurrenceId) -> Option<ShiftOccurrence> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.occurrences.get(&id).cloned()
    }

    pub fn schedule(&self, id: ScheduleId) -> Option<ShiftSchedule> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.schedules.get(&id).cloned()
    }

    pub fn user(&self, id: UserId) -> Option<UserProfile> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.users.get(&id).cloned()
    }

    pub fn registration_state(
        &self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
    ) -> Option<RegistrationState> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables
            .registrations
            .get(&(user_id, occurrence_id))
            .map(|row| row.state)
    }

    /// Count of active registrations for one occurrence
    pub fn active_count(&self, occurrence_id: OccurrenceId) -> u32 {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.active_count(occurrence_id)
    }

    /// Active registrants for one occurrence, sorted by user id
    pub fn roster(&self, occurrence_id: OccurrenceId) -> Vec<UserProfile> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        tables.roster(occurrence_id)
    }

    /// All occurrences in one period, sorted by id
    pub fn occurrences_in_period(&self, period_id: PeriodId) -> Vec<ShiftOccurrence> {
        let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<ShiftOccurrence> = tables
            .occurrences
            .values()
            .filter(|occ| occ.period_id == period_id)
            .cloned()
            .collect();
        rows.sort_by_key(|occ| occ.id);
        rows
    }

    // --- Writes ---

    /// Start staging a transaction
    pub fn begin(&self) -> Transaction<'_> {
        Transaction {
            store: self,
            ops: Vec::new(),
        }
    }

    fn apply_all(&self, ops: &[StoreOp]) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        for op in ops {
            tables.apply(op);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            occurrence_locks: Arc::clone(&self.occurrence_locks),
            schedule_locks: Arc::clone(&self.schedule_locks),
        }
    }
}

/// Staged operations, applied atomically on commit
pub struct Transaction<'a> {
    store: &'a Store,
    ops: Vec<StoreOp>,
}

impl Transaction<'_> {
    pub fn upsert_registration(
        &mut self,
        user_id: UserId,
        occurrence_id: OccurrenceId,
        state: RegistrationState,
        at: DateTime<Utc>,
    ) {
        self.ops.push(StoreOp::UpsertRegistration {
            user_id,
            occurrence_id,
            state,
            at,
        });
    }

    pub fn set_available_slots(&mut self, occurrence_id: OccurrenceId, available_slots: u32) {
        self.ops.push(StoreOp::SetAvailableSlots {
            occurrence_id,
            available_slots,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every staged operation in one critical section
    pub fn commit(self) {
        if self.ops.is_empty() {
            return;
        }
        self.store.apply_all(&self.ops);
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
