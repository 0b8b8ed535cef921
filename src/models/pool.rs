//! Pool and Team data structures.

use serde::{Deserialize, Serialize};

/// Identifier of a tournament (assigned by the store).
pub type TournamentId = i64;

/// Identifier of a pool.
pub type PoolId = i64;

/// Identifier of a team.
pub type TeamId = i64;

/// A team as listed in a pool.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: TeamId,
    pub team_name: String,
}

/// A group of teams playing round-robin within one tournament stage.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: PoolId,
    pub tournament_id: TournamentId,
    pub pool_name: String,
    /// Member teams, in the order the store returns them.
    pub teams: Vec<Team>,
}

impl Pool {
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.team_id).collect()
    }
}
