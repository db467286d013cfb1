//! Registration lifecycle specs
//!
//! Walk the register / unregister / switch state machine through the
//! public engine API and verify counts and rows at every step.

use crate::prelude::*;

#[tokio::test]
async fn three_users_contend_for_two_slots() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let shift = fx.occurrence(1, sched, 1, 2);
    let a = fx.user(1, "Ada");
    let b = fx.user(2, "Grace");
    let c = fx.user(3, "Lin");

    let counts = fx.engine.register(a, shift).await.unwrap();
    assert_eq!(counts.available_slots, 1);

    let counts = fx.engine.register(b, shift).await.unwrap();
    assert_eq!(counts.available_slots, 0);

    // Shift is full; the third registration is rejected cleanly
    let err = fx.engine.register(c, shift).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::CapacityExceeded {
            occurrence: shift,
            total_slots: 2
        }
    );
    assert_eq!(fx.store.registration_state(c, shift), None);

    let counts = fx.engine.unregister(a, shift).await.unwrap();
    assert_eq!(counts.available_slots, 1);

    // The freed slot goes to the retry
    let counts = fx.engine.register(c, shift).await.unwrap();
    assert_eq!(counts.available_slots, 0);
    assert_eq!(fx.store.active_count(shift), 2);
}

#[tokio::test]
async fn cancelled_registration_can_be_reactivated() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let shift = fx.occurrence(1, sched, 1, 3);
    let ada = fx.user(1, "Ada");

    fx.engine.register(ada, shift).await.unwrap();
    fx.engine.unregister(ada, shift).await.unwrap();
    assert_eq!(
        fx.store.registration_state(ada, shift),
        Some(RegistrationState::Cancelled)
    );

    fx.engine.register(ada, shift).await.unwrap();
    assert_eq!(
        fx.store.registration_state(ada, shift),
        Some(RegistrationState::Active)
    );
    assert_eq!(fx.available(shift), 2);
}

#[tokio::test]
async fn repeated_calls_are_idempotent() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let shift = fx.occurrence(1, sched, 1, 3);
    let ada = fx.user(1, "Ada");

    for _ in 0..3 {
        let counts = fx.engine.register(ada, shift).await.unwrap();
        assert_eq!(counts.available_slots, 2);
    }
    assert_eq!(fx.store.active_count(shift), 1);

    for _ in 0..3 {
        let counts = fx.engine.unregister(ada, shift).await.unwrap();
        assert_eq!(counts.available_slots, 3);
    }
    assert_eq!(fx.store.active_count(shift), 0);
}

#[tokio::test]
async fn unregistering_without_a_registration_is_accepted() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let shift = fx.occurrence(1, sched, 1, 2);
    let ada = fx.user(1, "Ada");

    let counts = fx.engine.unregister(ada, shift).await.unwrap();
    assert_eq!(counts.available_slots, 2);
    assert_eq!(fx.store.registration_state(ada, shift), None);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let shift = fx.occurrence(1, sched, 1, 2);
    let ada = fx.user(1, "Ada");

    assert_eq!(
        fx.engine.register(UserId(42), shift).await,
        Err(EngineError::UserNotFound(UserId(42)))
    );
    assert_eq!(
        fx.engine.register(ada, OccurrenceId(42)).await,
        Err(EngineError::OccurrenceNotFound(OccurrenceId(42)))
    );
    assert_eq!(
        fx.engine
            .switch(ada, shift, OccurrenceId(42))
            .await,
        Err(EngineError::OccurrenceNotFound(OccurrenceId(42)))
    );
}

#[tokio::test]
async fn registration_window_is_enforced_for_joining_only() {
    let fx = Roster::empty();
    let sched = fx.windowed_schedule(1, "evening desk", at(8, 0), at(12, 0));
    let shift = fx.occurrence(1, sched, 1, 2);
    let ada = fx.user(1, "Ada");

    fx.clock.set(at(7, 30));
    assert_eq!(
        fx.engine.register(ada, shift).await,
        Err(EngineError::RegistrationClosed(sched))
    );

    fx.clock.set(at(8, 0));
    fx.engine.register(ada, shift).await.unwrap();

    // Past close: joining is rejected, leaving still works
    fx.clock.set(at(12, 0));
    let grace = fx.user(2, "Grace");
    assert_eq!(
        fx.engine.register(grace, shift).await,
        Err(EngineError::RegistrationClosed(sched))
    );
    let counts = fx.engine.unregister(ada, shift).await.unwrap();
    assert_eq!(counts.available_slots, 2);
}

#[tokio::test]
async fn switching_frees_the_source_and_fills_the_target() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let morning = fx.occurrence(1, sched, 1, 2);
    let evening = fx.occurrence(2, sched, 1, 2);
    let ada = fx.user(1, "Ada");

    fx.engine.register(ada, morning).await.unwrap();
    let counts = fx.engine.switch(ada, morning, evening).await.unwrap();

    assert_eq!(counts.available_slots, 1);
    assert_eq!(fx.store.active_count(morning), 0);
    assert_eq!(fx.store.active_count(evening), 1);
    assert_eq!(
        fx.store.registration_state(ada, morning),
        Some(RegistrationState::Cancelled)
    );
}

#[tokio::test]
async fn failed_switch_leaves_the_source_registration_alone() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "front desk");
    let morning = fx.occurrence(1, sched, 1, 2);
    let evening = fx.occurrence(2, sched, 1, 1);
    let ada = fx.user(1, "Ada");
    let grace = fx.user(2, "Grace");

    fx.engine.register(grace, evening).await.unwrap();
    fx.engine.register(ada, morning).await.unwrap();

    let err = fx.engine.switch(ada, morning, evening).await.unwrap_err();
    assert!(matches!(err, EngineError::CapacityExceeded { .. }));

    // All-or-nothing: Ada keeps her morning slot
    assert_eq!(
        fx.store.registration_state(ada, morning),
        Some(RegistrationState::Active)
    );
    assert_eq!(fx.available(morning), 1);
    assert_eq!(fx.available(evening), 0);
}
