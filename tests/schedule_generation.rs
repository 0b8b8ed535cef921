//! Integration tests for round-robin generation and schedule replacement.

mod common;

use common::{seed_pools, FlakyStore, Op, TOURNAMENT};
use std::collections::HashSet;
use tournament_schedule_web::{
    build_schedule, generate_schedule, round_robin_pairs, FieldNumber, MatchStatus, MemoryStore,
    NewMatch, ScheduleConfig, ScheduleError, ScheduleStore, Stage,
};

#[test]
fn round_robin_pairs_every_team_once() {
    for n in 0..8i64 {
        let teams: Vec<i64> = (1..=n).collect();
        let pairs = round_robin_pairs(&teams);
        assert_eq!(pairs.len() as i64, n * (n - 1).max(0) / 2, "pool of {n}");

        let unordered: HashSet<(i64, i64)> =
            pairs.iter().map(|&(a, b)| (a.min(b), a.max(b))).collect();
        assert_eq!(unordered.len(), pairs.len(), "a pair repeats in pool of {n}");
        assert!(pairs.iter().all(|(home, away)| home != away));
    }
}

#[test]
fn round_robin_first_listed_team_is_home() {
    assert_eq!(
        round_robin_pairs(&[30, 10, 20]),
        vec![(30, 10), (30, 20), (10, 20)]
    );
}

#[test]
fn round_robin_ignores_repeated_team() {
    assert_eq!(round_robin_pairs(&[5, 6, 5]), vec![(5, 6)]);
}

#[test]
fn build_alternates_fields_across_pool_boundaries() {
    let store = MemoryStore::new();
    // 3 + 1 + 6 matches; the empty and single-team pools contribute nothing
    let pools = seed_pools(&store, TOURNAMENT, &[("A", 3), ("B", 2), ("C", 0), ("D", 1), ("E", 4)]);
    let fields = [FieldNumber(1), FieldNumber(2)];

    let schedule = build_schedule(TOURNAMENT, &pools, &fields).unwrap();

    assert_eq!(schedule.len(), 10);
    let orders: Vec<u32> = schedule.iter().map(|m| m.match_order).collect();
    assert_eq!(orders, (1..=10).collect::<Vec<u32>>());
    for pair in schedule.windows(2) {
        assert_ne!(pair[0].field_number, pair[1].field_number);
    }
    assert_eq!(schedule[0].field_number, FieldNumber(1));
    // Pool B's only match continues the global counter rather than restarting at field 1
    assert_eq!(schedule[3].pool_id, pools[1].pool_id);
    assert_eq!(schedule[3].field_number, FieldNumber(2));
    assert!(schedule.iter().all(|m| m.status == MatchStatus::Scheduled
        && m.stage == Stage::Preliminary
        && !m.is_playoff
        && m.schedule_date.is_none()
        && m.schedule_time.is_none()));
}

#[test]
fn build_cycles_through_more_than_two_fields() {
    let store = MemoryStore::new();
    let pools = seed_pools(&store, TOURNAMENT, &[("A", 4)]);
    let fields = [FieldNumber(3), FieldNumber(1), FieldNumber(7)];

    let schedule = build_schedule(TOURNAMENT, &pools, &fields).unwrap();

    let used: Vec<u8> = schedule.iter().map(|m| m.field_number.0).collect();
    assert_eq!(used, vec![3, 1, 7, 3, 1, 7]);
}

#[test]
fn build_requires_a_field() {
    let store = MemoryStore::new();
    let pools = seed_pools(&store, TOURNAMENT, &[("A", 4)]);
    assert_eq!(
        build_schedule(TOURNAMENT, &pools, &[]),
        Err(ScheduleError::NoFieldsConfigured)
    );
}

#[test]
fn generate_replaces_previous_schedule_but_keeps_playoffs() {
    let store = MemoryStore::new();
    let pools = seed_pools(&store, TOURNAMENT, &[("A", 4), ("B", 3)]);
    let config = ScheduleConfig::default();

    let mut playoff = NewMatch::pool_match(TOURNAMENT, pools[0].pool_id, 1, 2, FieldNumber(1), 1);
    playoff.is_playoff = true;
    playoff.stage = Stage::Final;
    let playoff = store.insert_matches(&[playoff]).unwrap().remove(0);

    let first = generate_schedule(&store, TOURNAMENT, &config).unwrap();
    assert_eq!(first.len(), 9);
    let second = generate_schedule(&store, TOURNAMENT, &config).unwrap();
    assert_eq!(second.len(), 9);

    let stored = store.matches(TOURNAMENT).unwrap();
    let stored_ids: Vec<_> = stored.iter().map(|m| m.match_id).collect();
    let second_ids: Vec<_> = second.iter().map(|m| m.match_id).collect();
    assert_eq!(stored_ids, second_ids);
    assert!(first.iter().all(|m| !stored_ids.contains(&m.match_id)));

    let orders: Vec<u32> = stored.iter().map(|m| m.match_order).collect();
    assert_eq!(orders, (1..=9).collect::<Vec<u32>>());

    let all = store.all_matches(TOURNAMENT).unwrap();
    assert!(all.contains(&playoff));
}

#[test]
fn generate_leaves_other_tournaments_alone() {
    let store = MemoryStore::new();
    seed_pools(&store, TOURNAMENT, &[("A", 3)]);
    seed_pools(&store, 2, &[("A", 2)]);
    let config = ScheduleConfig::default();

    generate_schedule(&store, 2, &config).unwrap();
    generate_schedule(&store, TOURNAMENT, &config).unwrap();
    generate_schedule(&store, TOURNAMENT, &config).unwrap();

    assert_eq!(store.matches(2).unwrap().len(), 1);
    assert_eq!(store.matches(TOURNAMENT).unwrap().len(), 3);
}

#[test]
fn failed_insert_keeps_old_schedule() {
    let store = FlakyStore::new();
    seed_pools(&store.inner, TOURNAMENT, &[("A", 4)]);
    let config = ScheduleConfig::default();
    let old = generate_schedule(&store, TOURNAMENT, &config).unwrap();

    store.fail(Op::Insert, 1);
    let err = generate_schedule(&store, TOURNAMENT, &config).unwrap_err();

    assert!(matches!(err, ScheduleError::Store(_)));
    assert_eq!(store.inner.matches(TOURNAMENT).unwrap(), old);
}

#[test]
fn failed_delete_rolls_back_new_schedule() {
    let store = FlakyStore::new();
    seed_pools(&store.inner, TOURNAMENT, &[("A", 3)]);
    let config = ScheduleConfig::default();
    let old = generate_schedule(&store, TOURNAMENT, &config).unwrap();

    store.fail(Op::Delete, 1);
    let err = generate_schedule(&store, TOURNAMENT, &config).unwrap_err();

    assert!(matches!(err, ScheduleError::Store(_)));
    assert_eq!(store.calls(Op::Delete), 3);
    assert_eq!(store.inner.matches(TOURNAMENT).unwrap(), old);
}

#[test]
fn failed_rollback_reports_partial_generation() {
    let store = FlakyStore::new();
    seed_pools(&store.inner, TOURNAMENT, &[("A", 3)]);
    let config = ScheduleConfig::default();
    generate_schedule(&store, TOURNAMENT, &config).unwrap();

    store.fail(Op::Delete, 2);
    let err = generate_schedule(&store, TOURNAMENT, &config).unwrap_err();

    assert!(matches!(
        err,
        ScheduleError::PartialGeneration { old: 3, new: 3, .. }
    ));
    assert_eq!(store.inner.matches(TOURNAMENT).unwrap().len(), 6);
}

#[test]
fn failed_pool_read_touches_nothing() {
    let store = FlakyStore::new();
    seed_pools(&store.inner, TOURNAMENT, &[("A", 3)]);
    store.fail(Op::Pools, 1);

    assert!(generate_schedule(&store, TOURNAMENT, &ScheduleConfig::default()).is_err());
    assert_eq!(store.calls(Op::Insert), 0);
    assert_eq!(store.calls(Op::Delete), 0);
}
