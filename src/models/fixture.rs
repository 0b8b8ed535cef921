//! Match (fixture), its status/stage, and the field it is played on.

use crate::models::clock;
use crate::models::pool::{PoolId, TeamId, TournamentId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a match (assigned by the store).
pub type MatchId = i64;

/// Playing field number (e.g. Field 1, Field 2).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldNumber(pub u8);

impl fmt::Display for FieldNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Tournament stage a match belongs to. Generated pool matches are `Preliminary`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    #[default]
    Preliminary,
    SuperRound,
    Playoff,
    Bronze,
    Final,
}

/// A stored match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: MatchId,
    pub tournament_id: TournamentId,
    /// Dense 1..N position among the tournament's non-playoff matches.
    pub match_order: u32,
    pub pool_id: PoolId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub field_number: FieldNumber,
    pub schedule_date: Option<NaiveDate>,
    #[serde(with = "clock::hh_mm_opt")]
    pub schedule_time: Option<NaiveTime>,
    pub status: MatchStatus,
    pub stage: Stage,
    pub is_playoff: bool,
    /// Bumped by the store on every write; upserts must carry the current value.
    pub version: u64,
}

/// Insert payload: a match before the store assigned its id.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewMatch {
    pub tournament_id: TournamentId,
    pub match_order: u32,
    pub pool_id: PoolId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub field_number: FieldNumber,
    pub schedule_date: Option<NaiveDate>,
    #[serde(with = "clock::hh_mm_opt")]
    pub schedule_time: Option<NaiveTime>,
    pub status: MatchStatus,
    pub stage: Stage,
    pub is_playoff: bool,
}

impl NewMatch {
    /// A freshly generated pool match: scheduled, preliminary, no date or time yet.
    pub fn pool_match(
        tournament_id: TournamentId,
        pool_id: PoolId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        field_number: FieldNumber,
        match_order: u32,
    ) -> Self {
        Self {
            tournament_id,
            match_order,
            pool_id,
            home_team_id,
            away_team_id,
            field_number,
            schedule_date: None,
            schedule_time: None,
            status: MatchStatus::Scheduled,
            stage: Stage::Preliminary,
            is_playoff: false,
        }
    }

    /// Materialize with a store-assigned id at version 1.
    pub fn into_match(self, match_id: MatchId) -> Match {
        Match {
            match_id,
            tournament_id: self.tournament_id,
            match_order: self.match_order,
            pool_id: self.pool_id,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            field_number: self.field_number,
            schedule_date: self.schedule_date,
            schedule_time: self.schedule_time,
            status: self.status,
            stage: self.stage,
            is_playoff: self.is_playoff,
            version: 1,
        }
    }
}
