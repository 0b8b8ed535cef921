//! The data-store seam: the relational tables the schedule is loaded from and flushed back to.
//!
//! Each call is an independent request that may fail on its own; nothing spans calls.

mod memory;

pub use memory::MemoryStore;

use crate::models::{Match, MatchId, NewMatch, Pool, TournamentId};
use thiserror::Error;

/// Store layer errors.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum StoreError {
    /// Request could not be served (network, database, ...).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    /// Upsert carried a stale version.
    #[error("Match {match_id} is at version {found}, update was based on {expected}")]
    Conflict {
        match_id: MatchId,
        expected: u64,
        found: u64,
    },
    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Tables the scheduler reads and writes.
pub trait ScheduleStore: Send + Sync {
    /// Pools of a tournament with their member teams, ordered by pool name.
    fn pools(&self, tournament_id: TournamentId) -> StoreResult<Vec<Pool>>;

    /// Non-playoff matches of a tournament, ordered by `match_order`.
    fn matches(&self, tournament_id: TournamentId) -> StoreResult<Vec<Match>>;

    /// Matches by id, in the order of `ids`. Unknown ids are omitted.
    fn matches_by_id(&self, ids: &[MatchId]) -> StoreResult<Vec<Match>>;

    /// Insert all rows or none; returns them with ids assigned.
    fn insert_matches(&self, rows: &[NewMatch]) -> StoreResult<Vec<Match>>;

    /// Delete the given matches. Unknown ids are ignored.
    fn delete_matches(&self, ids: &[MatchId]) -> StoreResult<()>;

    /// Write whole rows keyed by `match_id`, all or none.
    ///
    /// A row whose `version` differs from the stored one, or whose match no longer
    /// exists, fails the call with [`StoreError::Conflict`]. New rows go through
    /// [`ScheduleStore::insert_matches`]. Returns the rows as stored (with bumped versions).
    fn upsert_matches(&self, rows: &[Match]) -> StoreResult<Vec<Match>>;
}
