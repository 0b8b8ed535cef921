//! Scheduling business logic: generation, time ladder, batch editing.

mod editor;
mod generator;
mod time_ladder;

pub use editor::{EditorSession, PoolFilter};
pub use generator::{build_schedule, generate_schedule, round_robin_pairs};
pub use time_ladder::{time_ladder, PreviewRow, TimePreview};
