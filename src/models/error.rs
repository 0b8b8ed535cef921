//! Errors raised by schedule generation and batch editing.

use crate::models::fixture::{FieldNumber, MatchId};
use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during schedule operations.
///
/// Validation variants are returned before any store call is made.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ScheduleError {
    /// A batch operation was requested with no matches selected.
    #[error("No matches selected")]
    EmptySelection,
    /// Field is not one of the configured fields.
    #[error("Field {0} is not a configured field")]
    InvalidField(FieldNumber),
    /// Time of day could not be parsed as HH:MM.
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid time settings: {0}")]
    InvalidTimeSettings(String),
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// Time commit or preview edit without a computed preview.
    #[error("No time preview has been computed")]
    NoPreview,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("No fields configured")]
    NoFieldsConfigured,
    /// Someone else changed this match since it was loaded.
    #[error("Match {match_id} was changed by another session; reload and retry")]
    Conflict { match_id: MatchId },
    /// Regeneration inserted the new schedule but could neither remove the old one
    /// nor roll the new one back. Both sets are in the store.
    #[error("Schedule regeneration left {old} old and {new} new matches in place: {reason}")]
    PartialGeneration { old: usize, new: usize, reason: String },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { match_id, .. } => ScheduleError::Conflict { match_id },
            other => ScheduleError::Store(other),
        }
    }
}

impl ScheduleError {
    /// True for input errors rejected before touching the store.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ScheduleError::Conflict { .. }
                | ScheduleError::PartialGeneration { .. }
                | ScheduleError::Store(_)
        )
    }
}
