//! Shared fixtures: seeded tournaments and a store wrapper that fails on demand.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use tournament_schedule_web::{
    Match, MatchId, MemoryStore, NewMatch, Pool, ScheduleStore, StoreError, StoreResult,
    TournamentId,
};

pub const TOURNAMENT: TournamentId = 1;

/// Create one pool per `(name, team count)` with freshly registered teams.
pub fn seed_pools(store: &MemoryStore, tournament_id: TournamentId, pools: &[(&str, usize)]) -> Vec<Pool> {
    pools
        .iter()
        .map(|(name, size)| {
            let team_ids: Vec<_> = (0..*size)
                .map(|i| store.add_team(format!("{name}{i}")).unwrap().team_id)
                .collect();
            store.add_pool(tournament_id, *name, &team_ids).unwrap()
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Op {
    Pools,
    Matches,
    MatchesById,
    Insert,
    Delete,
    Upsert,
}

/// Delegates to a [`MemoryStore`] but fails the next N calls of chosen operations,
/// and counts calls per operation.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: Mutex<HashMap<Op, usize>>,
    calls: Mutex<HashMap<Op, usize>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` calls of `op`.
    pub fn fail(&self, op: Op, times: usize) {
        self.failures.lock().unwrap().insert(op, times);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    fn enter(&self, op: Op) -> StoreResult<()> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(StoreError::Unavailable(format!("{op:?} refused")))
            }
            _ => Ok(()),
        }
    }
}

impl ScheduleStore for FlakyStore {
    fn pools(&self, tournament_id: TournamentId) -> StoreResult<Vec<Pool>> {
        self.enter(Op::Pools)?;
        self.inner.pools(tournament_id)
    }

    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        self.enter(Op::Matches)?;
        self.inner.matches(tournament_id)
    }

    fn matches_by_id(&self, ids: &[MatchId]) -> StoreResult<Vec<Match>> {
        self.enter(Op::MatchesById)?;
        self.inner.matches_by_id(ids)
    }

    fn insert_matches(&self, rows: &[NewMatch]) -> StoreResult<Vec<Match>> {
        self.enter(Op::Insert)?;
        self.inner.insert_matches(rows)
    }

    fn delete_matches(&self, ids: &[MatchId]) -> StoreResult<()> {
        self.enter(Op::Delete)?;
        self.inner.delete_matches(ids)
    }

    fn upsert_matches(&self, rows: &[Match]) -> StoreResult<Vec<Match>> {
        self.enter(Op::Upsert)?;
        self.inner.upsert_matches(rows)
    }
}
