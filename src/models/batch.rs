//! Batch mutation records (for undo) and the time-ladder settings.

use crate::models::clock;
use crate::models::error::ScheduleError;
use crate::models::fixture::{FieldNumber, Match};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Start time, match length and gap (minutes) used to lay out a time ladder.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeSettings {
    #[serde(with = "clock::hh_mm")]
    pub start_time: NaiveTime,
    /// Match duration in minutes (at least 1).
    pub duration: u32,
    /// Gap between the end of one match and the start of the next, in minutes.
    pub interval: u32,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            duration: 90,
            interval: 15,
        }
    }
}

impl TimeSettings {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.duration == 0 {
            return Err(ScheduleError::InvalidTimeSettings(
                "duration must be at least 1 minute".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which column a batch mutation wrote, and the value it wrote.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BatchKind {
    Date(NaiveDate),
    Time(TimeSettings),
    Field(FieldNumber),
}

/// A successfully applied batch mutation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdate {
    pub kind: BatchKind,
    /// The affected matches as they were before the mutation.
    pub matches: Vec<Match>,
}

impl BatchUpdate {
    /// Copy the column this mutation touched from `before` into `current`.
    pub fn restore_into(&self, current: &mut Match, before: &Match) {
        match self.kind {
            BatchKind::Date(_) => current.schedule_date = before.schedule_date,
            BatchKind::Time(_) => current.schedule_time = before.schedule_time,
            BatchKind::Field(_) => current.field_number = before.field_number,
        }
    }
}

/// Bounded stack of the most recent batch mutations. The oldest is evicted past `depth`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UndoHistory {
    depth: usize,
    entries: VecDeque<BatchUpdate>,
}

impl UndoHistory {
    /// Depth is clamped to at least 1.
    pub fn new(depth: usize) -> Self {
        Self {
            depth: depth.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, update: BatchUpdate) {
        if self.entries.len() == self.depth {
            self.entries.pop_front();
        }
        self.entries.push_back(update);
    }

    pub fn pop(&mut self) -> Option<BatchUpdate> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&BatchUpdate> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(1)
    }
}
