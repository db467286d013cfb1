// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity ledger for one occurrence
//!
//! A `SlotLedger` is always derived from the authoritative active
//! registration count inside a locked transaction, never from the cached
//! counter alone. All transitions are pure and return the new ledger.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// More active registrations than the occurrence can hold. Cannot be
    /// produced by this type; indicates a corrupted store.
    #[error("active registrations ({active}) exceed capacity ({total_slots})")]
    ActiveExceedsCapacity { total_slots: u32, active: u32 },

    #[error("no slots available ({total_slots} total)")]
    Exhausted { total_slots: u32 },

    /// Release with nothing reserved. A programming error in the caller.
    #[error("release past capacity ({total_slots} total, none active)")]
    ReleaseOverflow { total_slots: u32 },
}

/// Derived slot accounting for one occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLedger {
    total_slots: u32,
    active: u32,
}

impl SlotLedger {
    /// Derive a ledger from capacity and the counted active registrations
    pub fn derive(total_slots: u32, active: u32) -> Result<Self, LedgerError> {
        if active > total_slots {
            return Err(LedgerError::ActiveExceedsCapacity {
                total_slots,
                active,
            });
        }
        Ok(Self {
            total_slots,
            active,
        })
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    pub fn active(&self) -> u32 {
        self.active
    }

    pub fn available_slots(&self) -> u32 {
        self.total_slots - self.active
    }

    pub fn can_reserve(&self) -> bool {
        self.available_slots() > 0
    }

    /// Consume one slot
    pub fn reserve(&self) -> Result<SlotLedger, LedgerError> {
        if !self.can_reserve() {
            return Err(LedgerError::Exhausted {
                total_slots: self.total_slots,
            });
        }
        Ok(Self {
            total_slots: self.total_slots,
            active: self.active + 1,
        })
    }

    /// Return one slot
    pub fn release(&self) -> Result<SlotLedger, LedgerError> {
        if self.active == 0 {
            return Err(LedgerError::ReleaseOverflow {
                total_slots: self.total_slots,
            });
        }
        Ok(Self {
            total_slots: self.total_slots,
            active: self.active - 1,
        })
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
