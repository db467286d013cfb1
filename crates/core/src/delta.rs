// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta events
//!
//! One `DeltaEvent` describes one committed registration transition. Each
//! event is self-contained: it carries the full resulting roster and slot
//! counts, so a subscriber can rebuild correct local state from the latest
//! event alone. The JSON field names are the payload contract and must stay
//! stable across transports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{OccurrenceId, PeriodId, UserId};
use crate::model::UserProfile;

/// Which transition the event announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaKind {
    Register,
    Unregister,
}

impl DeltaKind {
    /// Stable name for logging and routing
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Unregister => "unregister",
        }
    }
}

impl std::fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in an occurrence roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUser {
    pub id: UserId,
    pub display_name: String,
}

impl From<&UserProfile> for RosterUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name.clone(),
        }
    }
}

/// A committed registration transition, published exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaEvent {
    #[serde(rename = "type")]
    pub kind: DeltaKind,
    pub occurrence_id: OccurrenceId,
    pub period_id: PeriodId,
    /// The user whose transition this is
    pub user: RosterUser,
    pub available_slots: u32,
    pub total_slots: u32,
    /// Complete roster of active registrants after the transition
    pub roster: Vec<RosterUser>,
    pub timestamp: DateTime<Utc>,
}

impl DeltaEvent {
    /// Roster length and slot counts must agree; both come from the same
    /// locked read, so a mismatch means a defect upstream.
    pub fn counts_match_roster(&self) -> bool {
        self.roster.len() as u32 + self.available_slots == self.total_slots
    }
}
