//! Time ladder: back-to-back, non-overlapping start times for a batch of matches.

use crate::models::clock::{self, add_minutes};
use crate::models::{MatchId, ScheduleError, TimeSettings};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// `count` consecutive (start, end) slots: each match lasts `duration` minutes and the
/// next one starts `interval` minutes after it ends. Times wrap past midnight.
pub fn time_ladder(
    start: NaiveTime,
    count: usize,
    duration: u32,
    interval: u32,
) -> Vec<(NaiveTime, NaiveTime)> {
    let mut slots = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        let end = add_minutes(current, i64::from(duration));
        slots.push((current, end));
        current = add_minutes(end, i64::from(interval));
    }
    slots
}

/// One previewed match slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub match_id: MatchId,
    #[serde(with = "clock::hh_mm")]
    pub start: NaiveTime,
    #[serde(with = "clock::hh_mm")]
    pub end: NaiveTime,
    /// Start was typed in by hand rather than computed.
    pub edited: bool,
}

/// Proposed start times for the selected matches, before they are saved.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimePreview {
    settings: TimeSettings,
    rows: Vec<PreviewRow>,
}

impl TimePreview {
    /// Lay out a ladder over `match_ids` in the given order.
    pub fn new(settings: TimeSettings, match_ids: &[MatchId]) -> Result<Self, ScheduleError> {
        settings.validate()?;
        if match_ids.is_empty() {
            return Err(ScheduleError::EmptySelection);
        }
        let rows = time_ladder(
            settings.start_time,
            match_ids.len(),
            settings.duration,
            settings.interval,
        )
        .into_iter()
        .zip(match_ids)
        .map(|((start, end), &match_id)| PreviewRow {
            match_id,
            start,
            end,
            edited: false,
        })
        .collect();
        Ok(Self { settings, rows })
    }

    pub fn settings(&self) -> &TimeSettings {
        &self.settings
    }

    pub fn rows(&self) -> &[PreviewRow] {
        &self.rows
    }

    pub fn match_ids(&self) -> Vec<MatchId> {
        self.rows.iter().map(|r| r.match_id).collect()
    }

    /// Hand-edit one row's start. Its end follows; later rows are left alone
    /// until [`TimePreview::recalculate_following`] is called.
    pub fn override_start(&mut self, row: usize, start: NaiveTime) -> Result<(), ScheduleError> {
        let len = self.rows.len();
        let duration = self.settings.duration;
        let r = self
            .rows
            .get_mut(row)
            .ok_or(ScheduleError::IndexOutOfRange { index: row, len })?;
        r.start = start;
        r.end = add_minutes(start, i64::from(duration));
        r.edited = true;
        Ok(())
    }

    /// Re-run the ladder from `row`'s current start over it and every later row.
    pub fn recalculate_following(&mut self, row: usize) -> Result<(), ScheduleError> {
        let len = self.rows.len();
        let anchor = self
            .rows
            .get(row)
            .ok_or(ScheduleError::IndexOutOfRange { index: row, len })?
            .start;
        let slots = time_ladder(
            anchor,
            len - row,
            self.settings.duration,
            self.settings.interval,
        );
        for (offset, (r, (start, end))) in self.rows[row..].iter_mut().zip(slots).enumerate() {
            r.start = start;
            r.end = end;
            if offset > 0 {
                r.edited = false;
            }
        }
        Ok(())
    }
}
