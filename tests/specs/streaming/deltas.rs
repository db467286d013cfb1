//! Delta publication specs
//!
//! One delta per committed transition, in commit order, carrying the full
//! resulting state. A subscriber that applies deltas blindly must land on
//! the same numbers as a fresh full read.

use crate::prelude::*;

fn assert_matches_occupancy(fx: &Roster, events: &[DeltaEvent]) {
    for event in events {
        let snapshot = fx
            .engine
            .occupancy(event.period_id)
            .into_iter()
            .find(|entry| entry.occurrence_id == event.occurrence_id)
            .unwrap();
        assert_eq!(event.available_slots, snapshot.available_slots);
        assert_eq!(event.total_slots, snapshot.total_slots);
        assert_eq!(event.roster, snapshot.roster);
        assert!(event.counts_match_roster());
    }
}

#[tokio::test]
async fn every_delta_agrees_with_a_fresh_full_read() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "reception");
    let first = fx.occurrence(1, sched, 1, 2);
    let second = fx.occurrence(2, sched, 1, 2);
    let ada = fx.user(1, "Ada");
    let grace = fx.user(2, "Grace");

    let mut stream = fx.engine.subscribe(PeriodId(1));

    fx.engine.register(ada, first).await.unwrap();
    assert_matches_occupancy(&fx, &drain(&mut stream));

    fx.engine.register(grace, first).await.unwrap();
    assert_matches_occupancy(&fx, &drain(&mut stream));

    fx.engine.unregister(grace, first).await.unwrap();
    assert_matches_occupancy(&fx, &drain(&mut stream));

    // A switch commits two transitions at once; both deltas describe the
    // final state of their occurrence
    fx.engine.switch(ada, first, second).await.unwrap();
    let events = drain(&mut stream);
    assert_eq!(events.len(), 2);
    assert_matches_occupancy(&fx, &events);
}

#[tokio::test]
async fn deltas_arrive_in_commit_order() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "reception");
    let shift = fx.occurrence(1, sched, 1, 2);
    let ada = fx.user(1, "Ada");
    let grace = fx.user(2, "Grace");
    let lin = fx.user(3, "Lin");

    let mut stream = fx.engine.subscribe(PeriodId(1));

    fx.engine.register(ada, shift).await.unwrap();
    fx.engine.register(grace, shift).await.unwrap();
    fx.engine.unregister(ada, shift).await.unwrap();
    fx.engine.register(lin, shift).await.unwrap();
    fx.engine.unregister(lin, shift).await.unwrap();
    fx.engine.unregister(grace, shift).await.unwrap();

    let events = drain(&mut stream);
    let kinds: Vec<DeltaKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DeltaKind::Register,
            DeltaKind::Register,
            DeltaKind::Unregister,
            DeltaKind::Register,
            DeltaKind::Unregister,
            DeltaKind::Unregister,
        ]
    );

    let availability: Vec<u32> = events.iter().map(|e| e.available_slots).collect();
    assert_eq!(availability, vec![1, 0, 1, 0, 1, 2]);

    let roster_sizes: Vec<usize> = events.iter().map(|e| e.roster.len()).collect();
    assert_eq!(roster_sizes, vec![1, 2, 1, 2, 1, 0]);
}

#[tokio::test]
async fn subscribers_only_see_their_own_period() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "reception");
    let weekday = fx.occurrence(1, sched, 1, 2);
    let weekend = fx.occurrence(2, sched, 2, 2);
    let ada = fx.user(1, "Ada");
    let grace = fx.user(2, "Grace");

    let mut weekday_stream = fx.engine.subscribe(PeriodId(1));
    let mut weekend_stream = fx.engine.subscribe(PeriodId(2));

    fx.engine.register(ada, weekday).await.unwrap();
    fx.engine.register(grace, weekend).await.unwrap();

    let weekday_events = drain(&mut weekday_stream);
    assert_eq!(weekday_events.len(), 1);
    assert_eq!(weekday_events[0].occurrence_id, weekday);
    assert_eq!(weekday_events[0].user.display_name, "Ada");

    let weekend_events = drain(&mut weekend_stream);
    assert_eq!(weekend_events.len(), 1);
    assert_eq!(weekend_events[0].occurrence_id, weekend);

    // Wire shape of the payload is part of the contract
    let json = serde_json::to_value(&weekday_events[0]).unwrap();
    assert_eq!(json["type"], "register");
    assert_eq!(json["occurrence_id"], 1);
    assert_eq!(json["available_slots"], 1);
    assert_eq!(json["roster"][0]["display_name"], "Ada");
}

#[tokio::test]
async fn rejections_and_no_ops_publish_nothing() {
    let fx = Roster::empty();
    let sched = fx.schedule(1, "reception");
    let shift = fx.occurrence(1, sched, 1, 1);
    let other = fx.occurrence(2, sched, 1, 1);
    let ada = fx.user(1, "Ada");
    let grace = fx.user(2, "Grace");

    fx.engine.register(ada, shift).await.unwrap();
    fx.engine.register(grace, other).await.unwrap();

    let mut stream = fx.engine.subscribe(PeriodId(1));

    // Each of these commits nothing
    fx.engine.register(ada, shift).await.unwrap();
    fx.engine.unregister(grace, shift).await.unwrap();
    fx.engine.register(grace, shift).await.unwrap_err();
    fx.engine.switch(grace, other, shift).await.unwrap_err();
    fx.engine.register(UserId(9), shift).await.unwrap_err();

    assert!(drain(&mut stream).is_empty());
}
