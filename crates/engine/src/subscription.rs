// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client delta stream sessions
//!
//! A `DeltaStream` is one subscriber's live view of a period. It owns its
//! bus registration: dropping the stream unsubscribes, and a forced
//! disconnect (buffer overflow) closes the channel so `recv` returns
//! `None`. There is no replay; a client that sees end-of-stream refetches
//! full state and opens a new stream.

use roster_core::{DeltaBus, DeltaEvent, DeltaReceiver, PeriodId, SubscriberId};

/// A live, cancellable stream of deltas for one period
pub struct DeltaStream {
    id: SubscriberId,
    period_id: PeriodId,
    rx: DeltaReceiver,
    bus: DeltaBus,
}

impl DeltaStream {
    pub(crate) fn open(bus: &DeltaBus, period_id: PeriodId) -> Self {
        let (id, rx) = bus.subscribe(period_id);
        Self {
            id,
            period_id,
            rx,
            bus: bus.clone(),
        }
    }

    /// The period this stream is scoped to
    pub fn period_id(&self) -> PeriodId {
        self.period_id
    }

    /// Next delta, or `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<DeltaEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive for callers polling between frames
    pub fn try_recv(&mut self) -> Option<DeltaEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for DeltaStream {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.id);
    }
}
