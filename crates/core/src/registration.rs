// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration state machine
//!
//! Lifecycle of one (user, occurrence) pair. `Unregistered` is the implicit
//! absence of a row; cancellation is soft, so re-registering flips the same
//! row back to active. Both inputs are idempotent: repeating one from its
//! own end state is a successful no-op that must consume no capacity and
//! publish nothing.

use serde::{Deserialize, Serialize};

/// Stored state of a registration row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationState {
    Active,
    Cancelled,
}

/// Full per-key view, including the no-row case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// No row exists for this (user, occurrence)
    Unregistered,
    Active,
    Cancelled,
}

impl RegistrationStatus {
    pub fn from_row(row: Option<RegistrationState>) -> Self {
        match row {
            None => Self::Unregistered,
            Some(RegistrationState::Active) => Self::Active,
            Some(RegistrationState::Cancelled) => Self::Cancelled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Pure transition table
    pub fn transition(&self, input: RegistrationInput) -> Decision {
        match (self, input) {
            (Self::Unregistered | Self::Cancelled, RegistrationInput::Register) => {
                Decision::Apply {
                    state: RegistrationState::Active,
                    slot: SlotEffect::Reserve,
                }
            }
            (Self::Active, RegistrationInput::Register) => Decision::NoOp,

            (Self::Active, RegistrationInput::Unregister) => Decision::Apply {
                state: RegistrationState::Cancelled,
                slot: SlotEffect::Release,
            },
            (Self::Unregistered | Self::Cancelled, RegistrationInput::Unregister) => {
                Decision::NoOp
            }
        }
    }
}

/// Events that trigger registration transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationInput {
    Register,
    Unregister,
}

/// Ledger adjustment a transition requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEffect {
    Reserve,
    Release,
}

/// Outcome of applying an input to the current per-key state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the row to `state` and apply `slot` to the ledger
    Apply {
        state: RegistrationState,
        slot: SlotEffect,
    },
    /// Already in the requested end state; succeed without writing
    NoOp,
}
