//! Tournament schedule web app: library with models, store seam and scheduling logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::ScheduleConfig;
pub use logic::{
    build_schedule, generate_schedule, round_robin_pairs, time_ladder, EditorSession, PoolFilter,
    PreviewRow, TimePreview,
};
pub use models::clock::{add_minutes_to_time, format_clock, parse_clock};
pub use models::{
    BatchKind, BatchUpdate, FieldNumber, Match, MatchId, MatchStatus, NewMatch, Pool, PoolId,
    ScheduleError, Stage, Team, TeamId, TimeSettings, TournamentId, UndoHistory,
};
pub use store::{MemoryStore, ScheduleStore, StoreError, StoreResult};
