// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow unwrap/expect in test code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! roster-storage: In-memory transactional row store
//!
//! This crate provides:
//! - Materialized row tables with atomic staged-operation commits
//! - Per-row async locks handed out as owned guards
//! - The seeding boundary for the host application's CRUD layer

pub mod state;
pub mod store;

pub use state::{StoreOp, Tables};
pub use store::{RowGuard, Store, StoreError, Transaction};
