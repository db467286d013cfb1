//! Shared fixtures for the behavioral specs.
//!
//! Every spec starts from a `Roster`: one in-memory store, one engine, one
//! fake clock pinned to 09:00. Specs seed what they need through the
//! helpers and then drive the engine directly.

pub use std::sync::Arc;
pub use std::time::Duration;

pub use chrono::{DateTime, TimeZone, Utc};

pub use roster_core::{
    DeltaEvent, DeltaKind, FakeClock, OccurrenceId, PeriodId, RegistrationState, ScheduleId,
    ShiftOccurrence, ShiftSchedule, UserId, UserProfile,
};
pub use roster_engine::{
    retry_timeouts, DeltaStream, EngineConfig, EngineError, PeriodView, RegistrationEngine,
    RetryConfig,
};
pub use roster_storage::Store;

/// All specs run on 2026-05-01; hours and minutes vary
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, h, m, 0).unwrap()
}

/// One store + engine + fake clock
pub struct Roster {
    pub store: Store,
    pub clock: FakeClock,
    pub engine: Arc<RegistrationEngine<FakeClock>>,
}

impl Roster {
    pub fn empty() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Store::new();
        let clock = FakeClock::at(at(9, 0));
        let engine = Arc::new(RegistrationEngine::new(store.clone(), clock.clone(), config));
        Self {
            store,
            clock,
            engine,
        }
    }

    /// Seed a schedule with no registration window
    pub fn schedule(&self, id: u64, name: &str) -> ScheduleId {
        let id = ScheduleId(id);
        self.store
            .insert_schedule(ShiftSchedule::new(id, name))
            .unwrap();
        id
    }

    pub fn windowed_schedule(
        &self,
        id: u64,
        name: &str,
        opens: DateTime<Utc>,
        closes: DateTime<Utc>,
    ) -> ScheduleId {
        let id = ScheduleId(id);
        self.store
            .insert_schedule(ShiftSchedule::new(id, name).with_window(Some(opens), Some(closes)))
            .unwrap();
        id
    }

    /// Seed an occurrence; shifts in these specs always run 10:00-12:00
    pub fn occurrence(
        &self,
        id: u64,
        schedule: ScheduleId,
        period: u64,
        slots: u32,
    ) -> OccurrenceId {
        let id = OccurrenceId(id);
        self.store
            .insert_occurrence(ShiftOccurrence::new(
                id,
                schedule,
                PeriodId(period),
                at(10, 0),
                at(12, 0),
                slots,
            ))
            .unwrap();
        id
    }

    pub fn user(&self, id: u64, name: &str) -> UserId {
        let id = UserId(id);
        self.store.insert_user(UserProfile::new(id, name)).unwrap();
        id
    }

    /// Seed `n` users named worker-1 through worker-n
    pub fn crowd(&self, n: u64) -> Vec<UserId> {
        (1..=n)
            .map(|i| self.user(i, &format!("worker-{i}")))
            .collect()
    }

    /// Availability derived straight from the registration rows
    pub fn available(&self, id: OccurrenceId) -> u32 {
        let occ = self.store.occurrence(id).unwrap();
        occ.total_slots - self.store.active_count(id)
    }
}

/// Collect everything currently buffered on a stream
pub fn drain(stream: &mut DeltaStream) -> Vec<DeltaEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.try_recv() {
        events.push(event);
    }
    events
}
