// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the registration engine

use roster_core::{OccurrenceId, ScheduleId, UserId};
use thiserror::Error;

/// Errors surfaced by registration operations
///
/// `CapacityExceeded` and `RegistrationClosed` are expected business
/// rejections. `LockTimeout` is retry-safe: the operation had no side
/// effects. `InvariantViolation` means the engine refused to commit a
/// transaction that would corrupt the ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("occurrence not found: {0}")]
    OccurrenceNotFound(OccurrenceId),
    #[error("schedule not found: {0}")]
    ScheduleNotFound(ScheduleId),
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("no slots available: occurrence {occurrence} is full ({total_slots} total)")]
    CapacityExceeded {
        occurrence: OccurrenceId,
        total_slots: u32,
    },
    #[error("registration closed for schedule {0}")]
    RegistrationClosed(ScheduleId),
    #[error("timed out waiting for row locks")]
    LockTimeout,
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Whether a caller may safely retry the operation as-is
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout)
    }
}
