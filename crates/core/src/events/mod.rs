// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta fan-out to live subscribers
//!
//! This module provides:
//! - `DeltaBus` - Route committed delta events to period subscribers

mod bus;

pub use bus::{DeltaBus, DeltaReceiver, DEFAULT_SUBSCRIBER_BUFFER};
