//! Data structures for the schedule: pools, matches, batch records, errors.

mod batch;
pub mod clock;
mod error;
mod fixture;
mod pool;

pub use batch::{BatchKind, BatchUpdate, TimeSettings, UndoHistory};
pub use error::ScheduleError;
pub use fixture::{FieldNumber, Match, MatchId, MatchStatus, NewMatch, Stage};
pub use pool::{Pool, PoolId, Team, TeamId, TournamentId};
