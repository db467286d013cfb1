// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roster-core: Domain model for the shift registration engine
//!
//! This crate provides:
//! - Pure state machines for registrations and slot accounting
//! - Self-contained delta events and the bus that fans them out
//! - Clock and identifier abstractions shared across the workspace

pub mod clock;
pub mod id;

pub mod events;

// State machines and rows (order matters for dependencies)
pub mod registration;
pub mod model;
pub mod ledger;
pub mod delta;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use delta::{DeltaEvent, DeltaKind, RosterUser};
pub use events::{DeltaBus, DeltaReceiver, DEFAULT_SUBSCRIBER_BUFFER};
pub use id::{OccurrenceId, PeriodId, ScheduleId, SubscriberId, UserId};
pub use ledger::{LedgerError, SlotLedger};
pub use model::{Registration, ShiftOccurrence, ShiftSchedule, UserProfile};
pub use registration::{
    Decision, RegistrationInput, RegistrationState, RegistrationStatus, SlotEffect,
};
