// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Shift registration engine

mod config;
mod coordinator;
mod engine;
mod error;
mod retry;
mod subscription;
mod view;

pub use config::{EngineConfig, RetryConfig};
pub use coordinator::{LockCoordinator, LockSet};
pub use engine::{OccurrenceSnapshot, RegistrationEngine, SlotCounts};
pub use error::EngineError;
pub use retry::retry_timeouts;
pub use subscription::DeltaStream;
pub use view::PeriodView;
