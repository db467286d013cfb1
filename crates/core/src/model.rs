// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Domain rows for shift registration
//!
//! These are the shapes the store materializes and the engine reads under
//! row locks. `available_slots` on an occurrence is a cached counter; the
//! authoritative value is always re-derived from the active registration
//! count inside a locked transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OccurrenceId, PeriodId, ScheduleId, UserId};
use crate::registration::RegistrationState;

/// One dated, timed instance of a recurring shift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftOccurrence {
    pub id: OccurrenceId,
    pub schedule_id: ScheduleId,
    pub period_id: PeriodId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Capacity, fixed at creation
    pub total_slots: u32,
    /// Cached availability; re-derived under lock before every mutation
    pub available_slots: u32,
}

impl ShiftOccurrence {
    pub fn new(
        id: OccurrenceId,
        schedule_id: ScheduleId,
        period_id: PeriodId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        total_slots: u32,
    ) -> Self {
        Self {
            id,
            schedule_id,
            period_id,
            starts_at,
            ends_at,
            total_slots,
            available_slots: total_slots,
        }
    }
}

/// The recurring definition an occurrence belongs to
///
/// Owned by the host application; this core only reads the registration
/// window while holding the schedule lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSchedule {
    pub id: ScheduleId,
    pub name: String,
    /// Registration opens at this time; `None` means no lower bound
    pub registration_opens_at: Option<DateTime<Utc>>,
    /// Registration closes at this time; `None` means no upper bound
    pub registration_closes_at: Option<DateTime<Utc>>,
}

impl ShiftSchedule {
    pub fn new(id: ScheduleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            registration_opens_at: None,
            registration_closes_at: None,
        }
    }

    pub fn with_window(
        mut self,
        opens_at: Option<DateTime<Utc>>,
        closes_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.registration_opens_at = opens_at;
        self.registration_closes_at = closes_at;
        self
    }

    /// Whether registration is open at `now` (half-open: opens <= now < closes)
    pub fn registration_open_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(opens) = self.registration_opens_at {
            if now < opens {
                return false;
            }
        }
        if let Some(closes) = self.registration_closes_at {
            if now >= closes {
                return false;
            }
        }
        true
    }
}

/// Relationship row keyed by (user, occurrence)
///
/// Cancellation is soft: the row flips to `Cancelled` and stays for the
/// audit trail; re-registering flips it back to `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub user_id: UserId,
    pub occurrence_id: OccurrenceId,
    pub state: RegistrationState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of the user directory this core reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub display_name: String,
}

impl UserProfile {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
