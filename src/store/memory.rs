//! In-process store backing the web binary and the tests.

use super::{ScheduleStore, StoreError, StoreResult};
use crate::models::{Match, MatchId, NewMatch, Pool, Team, TeamId, TournamentId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    teams: HashMap<TeamId, Team>,
    pools: Vec<Pool>,
    matches: BTreeMap<MatchId, Match>,
    next_team_id: i64,
    next_pool_id: i64,
    next_match_id: i64,
}

/// Tables held in memory behind one lock, so every call is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Register a team.
    pub fn add_team(&self, team_name: impl Into<String>) -> StoreResult<Team> {
        let mut t = self.write()?;
        t.next_team_id += 1;
        let team = Team {
            team_id: t.next_team_id,
            team_name: team_name.into(),
        };
        t.teams.insert(team.team_id, team.clone());
        Ok(team)
    }

    /// Create a pool in a tournament with the given member teams (kept in this order).
    pub fn add_pool(
        &self,
        tournament_id: TournamentId,
        pool_name: impl Into<String>,
        team_ids: &[TeamId],
    ) -> StoreResult<Pool> {
        let mut t = self.write()?;
        let teams = team_ids
            .iter()
            .map(|id| {
                t.teams
                    .get(id)
                    .cloned()
                    .ok_or(StoreError::NotFound { entity: "Team", id: *id })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        t.next_pool_id += 1;
        let pool = Pool {
            pool_id: t.next_pool_id,
            tournament_id,
            pool_name: pool_name.into(),
            teams,
        };
        t.pools.push(pool.clone());
        Ok(pool)
    }

    /// Every match of a tournament, playoff included, ordered by id.
    pub fn all_matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let t = self.read()?;
        Ok(t.matches
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect())
    }
}

impl ScheduleStore for MemoryStore {
    fn pools(&self, tournament_id: TournamentId) -> StoreResult<Vec<Pool>> {
        let t = self.read()?;
        let mut pools: Vec<Pool> = t
            .pools
            .iter()
            .filter(|p| p.tournament_id == tournament_id)
            .cloned()
            .collect();
        pools.sort_by(|a, b| a.pool_name.cmp(&b.pool_name));
        Ok(pools)
    }

    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>> {
        let t = self.read()?;
        let mut matches: Vec<Match> = t
            .matches
            .values()
            .filter(|m| m.tournament_id == tournament_id && !m.is_playoff)
            .cloned()
            .collect();
        matches.sort_by_key(|m| (m.match_order, m.match_id));
        Ok(matches)
    }

    fn matches_by_id(&self, ids: &[MatchId]) -> StoreResult<Vec<Match>> {
        let t = self.read()?;
        Ok(ids.iter().filter_map(|id| t.matches.get(id).cloned()).collect())
    }

    fn insert_matches(&self, rows: &[NewMatch]) -> StoreResult<Vec<Match>> {
        let mut t = self.write()?;
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            t.next_match_id += 1;
            let m = row.clone().into_match(t.next_match_id);
            t.matches.insert(m.match_id, m.clone());
            inserted.push(m);
        }
        Ok(inserted)
    }

    fn delete_matches(&self, ids: &[MatchId]) -> StoreResult<()> {
        let mut t = self.write()?;
        for id in ids {
            t.matches.remove(id);
        }
        Ok(())
    }

    fn upsert_matches(&self, rows: &[Match]) -> StoreResult<Vec<Match>> {
        let mut t = self.write()?;
        // Check every row before writing any, so a conflict leaves the table untouched.
        // A missing row counts as version 0, so deleted matches are never written back.
        for row in rows {
            let found = t.matches.get(&row.match_id).map_or(0, |m| m.version);
            if found != row.version {
                return Err(StoreError::Conflict {
                    match_id: row.match_id,
                    expected: row.version,
                    found,
                });
            }
        }
        let mut written = Vec::with_capacity(rows.len());
        for row in rows {
            let mut m = row.clone();
            m.version = row.version + 1;
            t.matches.insert(m.match_id, m.clone());
            written.push(m);
        }
        Ok(written)
    }
}
