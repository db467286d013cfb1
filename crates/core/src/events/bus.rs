// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delta bus for routing committed transitions to period subscribers
//!
//! Publish is fire-and-forget: each subscriber owns a bounded channel and a
//! full buffer disconnects that subscriber instead of blocking the writer.
//! A disconnected client sees end-of-stream and re-primes through the
//! reconnect path (full refetch, fresh subscription).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::delta::DeltaEvent;
use crate::id::{PeriodId, SubscriberId};

/// Receiver for delta delivery
pub type DeltaReceiver = mpsc::Receiver<DeltaEvent>;

/// Per-subscriber channel capacity when none is configured
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 64;

struct SubscriberSlot {
    period_id: PeriodId,
    tx: mpsc::Sender<DeltaEvent>,
}

/// The delta bus routes committed events to subscribers of the same period
pub struct DeltaBus {
    subscribers: Arc<RwLock<HashMap<SubscriberId, SubscriberSlot>>>,
    buffer: usize,
}

impl DeltaBus {
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_SUBSCRIBER_BUFFER)
    }

    /// Bus whose subscriber channels hold `buffer` undelivered events
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            // tokio channels reject a zero capacity
            buffer: buffer.max(1),
        }
    }

    /// Subscribe to deltas for one period
    /// Returns the subscriber handle and the receiving end of its channel
    pub fn subscribe(&self, period_id: PeriodId) -> (SubscriberId, DeltaReceiver) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = SubscriberId::generate();

        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id.clone(), SubscriberSlot { period_id, tx });

        (id, rx)
    }

    /// Unsubscribe a delta stream
    pub fn unsubscribe(&self, id: &SubscriberId) {
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.remove(id);
    }

    /// Publish a committed delta to all subscribers of its period
    ///
    /// Never blocks. Subscribers whose buffer is full are disconnected;
    /// subscribers whose receiver was dropped are pruned.
    pub fn publish(&self, event: &DeltaEvent) {
        let mut dead = Vec::new();

        {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            for (id, slot) in subs.iter() {
                if slot.period_id != event.period_id {
                    continue;
                }
                match slot.tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            subscriber = %id,
                            period = %slot.period_id,
                            "subscriber buffer full, disconnecting"
                        );
                        dead.push(id.clone());
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(subscriber = %id, "pruning closed subscriber");
                        dead.push(id.clone());
                    }
                }
            }
        }

        if !dead.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in dead {
                subs.remove(&id);
            }
        }
    }

    /// Get count of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for DeltaBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeltaBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            buffer: self.buffer,
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
