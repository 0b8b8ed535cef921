//! Batch schedule editor: a per-operator working set of matches with a selection,
//! bulk date/field/time edits, drag reordering and undo.
//!
//! Every mutation is staged on copies, written to the store, and only applied to the
//! session once the store accepts it. A failed call leaves the session untouched.

use crate::config::ScheduleConfig;
use crate::logic::time_ladder::TimePreview;
use crate::models::{
    BatchKind, BatchUpdate, FieldNumber, Match, MatchId, PoolId, ScheduleError, TimeSettings,
    TournamentId, UndoHistory,
};
use crate::store::ScheduleStore;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which pool's matches the editor shows. Reordering and "select all" act on this view.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "pool_id")]
pub enum PoolFilter {
    #[default]
    All,
    Pool(PoolId),
}

impl PoolFilter {
    pub fn admits(&self, m: &Match) -> bool {
        match self {
            PoolFilter::All => true,
            PoolFilter::Pool(id) => m.pool_id == *id,
        }
    }
}

/// Editing state of one operator for one tournament.
#[derive(Clone, Debug, Serialize)]
pub struct EditorSession {
    tournament_id: TournamentId,
    /// Non-playoff matches ordered by `match_order`.
    matches: Vec<Match>,
    filter: PoolFilter,
    /// Selected match ids, in the order they were selected.
    selection: Vec<MatchId>,
    history: UndoHistory,
    time_preview: Option<TimePreview>,
    #[serde(skip)]
    config: ScheduleConfig,
}

impl EditorSession {
    /// Fetch the tournament's matches and start an empty selection.
    pub fn load(
        store: &dyn ScheduleStore,
        tournament_id: TournamentId,
        config: &ScheduleConfig,
    ) -> Result<Self, ScheduleError> {
        let matches = store.matches(tournament_id).map_err(|e| {
            log::error!("Fetching matches of tournament {tournament_id} failed: {e}");
            e
        })?;
        Ok(Self {
            tournament_id,
            matches,
            filter: PoolFilter::All,
            selection: Vec::new(),
            history: UndoHistory::new(config.undo_depth),
            time_preview: None,
            config: config.clone(),
        })
    }

    /// Re-fetch the match list. Selected or previewed matches that disappeared are dropped.
    pub fn refresh(&mut self, store: &dyn ScheduleStore) -> Result<(), ScheduleError> {
        let matches = store.matches(self.tournament_id).map_err(|e| {
            log::error!(
                "Fetching matches of tournament {} failed: {e}",
                self.tournament_id
            );
            e
        })?;
        self.matches = matches;
        let matches = &self.matches;
        self.selection
            .retain(|id| matches.iter().any(|m| m.match_id == *id));
        if let Some(preview) = &self.time_preview {
            if preview
                .match_ids()
                .iter()
                .any(|id| !matches.iter().any(|m| m.match_id == *id))
            {
                self.time_preview = None;
            }
        }
        Ok(())
    }

    pub fn tournament_id(&self) -> TournamentId {
        self.tournament_id
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn find(&self, match_id: MatchId) -> Option<&Match> {
        self.matches.iter().find(|m| m.match_id == match_id)
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn time_preview(&self) -> Option<&TimePreview> {
        self.time_preview.as_ref()
    }

    /// Settings the time dialog starts from.
    pub fn default_time_settings(&self) -> TimeSettings {
        self.config.time_settings
    }

    // --- Filter and selection (in memory only) ---

    pub fn filter(&self) -> PoolFilter {
        self.filter
    }

    pub fn set_pool_filter(&mut self, filter: PoolFilter) {
        self.filter = filter;
    }

    /// Matches passing the current filter, in order.
    pub fn visible(&self) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| self.filter.admits(m))
            .collect()
    }

    pub fn selection(&self) -> &[MatchId] {
        &self.selection
    }

    pub fn is_selected(&self, match_id: MatchId) -> bool {
        self.selection.contains(&match_id)
    }

    /// Selected matches in selection order.
    pub fn selected_matches(&self) -> Vec<&Match> {
        self.selection
            .iter()
            .filter_map(|id| self.find(*id))
            .collect()
    }

    pub fn select(&mut self, match_id: MatchId) -> Result<(), ScheduleError> {
        if self.find(match_id).is_none() {
            return Err(ScheduleError::MatchNotFound(match_id));
        }
        if !self.is_selected(match_id) {
            self.selection.push(match_id);
        }
        Ok(())
    }

    pub fn deselect(&mut self, match_id: MatchId) {
        self.selection.retain(|id| *id != match_id);
    }

    pub fn toggle(&mut self, match_id: MatchId) -> Result<(), ScheduleError> {
        if self.is_selected(match_id) {
            self.deselect(match_id);
            Ok(())
        } else {
            self.select(match_id)
        }
    }

    /// Add every visible match not yet selected, in display order.
    pub fn select_all_visible(&mut self) {
        let ids: Vec<MatchId> = self.visible().iter().map(|m| m.match_id).collect();
        for id in ids {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    /// Remove every visible match from the selection; hidden ones stay selected.
    pub fn deselect_all_visible(&mut self) {
        let filter = self.filter;
        let matches = &self.matches;
        self.selection.retain(|id| {
            !matches
                .iter()
                .any(|m| m.match_id == *id && filter.admits(m))
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Batch mutations ---

    /// Set the same date on every selected match. Returns the number of matches updated.
    pub fn batch_update_date(
        &mut self,
        store: &dyn ScheduleStore,
        date: NaiveDate,
    ) -> Result<usize, ScheduleError> {
        let snapshot = self.selected_snapshot()?;
        let staged = snapshot
            .iter()
            .cloned()
            .map(|mut m| {
                m.schedule_date = Some(date);
                m
            })
            .collect();
        self.apply_batch(store, BatchKind::Date(date), staged, snapshot)
    }

    /// Move every selected match to the same field.
    pub fn batch_update_field(
        &mut self,
        store: &dyn ScheduleStore,
        field: FieldNumber,
    ) -> Result<usize, ScheduleError> {
        if !self.config.is_configured_field(field) {
            return Err(ScheduleError::InvalidField(field));
        }
        let snapshot = self.selected_snapshot()?;
        let staged = snapshot
            .iter()
            .cloned()
            .map(|mut m| {
                m.field_number = field;
                m
            })
            .collect();
        self.apply_batch(store, BatchKind::Field(field), staged, snapshot)
    }

    /// Compute a time ladder over the selection (replaces any pending preview).
    pub fn preview_times(&mut self, settings: TimeSettings) -> Result<&TimePreview, ScheduleError> {
        let preview = TimePreview::new(settings, &self.selection)?;
        Ok(&*self.time_preview.insert(preview))
    }

    pub fn override_preview_start(
        &mut self,
        row: usize,
        start: NaiveTime,
    ) -> Result<&TimePreview, ScheduleError> {
        let preview = self.time_preview.as_mut().ok_or(ScheduleError::NoPreview)?;
        preview.override_start(row, start)?;
        Ok(&*preview)
    }

    pub fn recalculate_following(&mut self, row: usize) -> Result<&TimePreview, ScheduleError> {
        let preview = self.time_preview.as_mut().ok_or(ScheduleError::NoPreview)?;
        preview.recalculate_following(row)?;
        Ok(&*preview)
    }

    /// Drop the pending preview without saving. Returns whether there was one.
    pub fn discard_time_preview(&mut self) -> bool {
        self.time_preview.take().is_some()
    }

    /// Save the previewed start times. The preview is cleared once the store accepts them.
    pub fn commit_time_preview(
        &mut self,
        store: &dyn ScheduleStore,
    ) -> Result<usize, ScheduleError> {
        let preview = self.time_preview.as_ref().ok_or(ScheduleError::NoPreview)?;
        let mut snapshot = Vec::with_capacity(preview.rows().len());
        let mut staged = Vec::with_capacity(preview.rows().len());
        for row in preview.rows() {
            let current = self
                .find(row.match_id)
                .ok_or(ScheduleError::MatchNotFound(row.match_id))?;
            let mut updated = current.clone();
            updated.schedule_time = Some(row.start);
            snapshot.push(current.clone());
            staged.push(updated);
        }
        let kind = BatchKind::Time(*preview.settings());
        let count = self.apply_batch(store, kind, staged, snapshot)?;
        self.time_preview = None;
        Ok(count)
    }

    /// Drag a match from `source` to `destination` (positions in the filtered view) and
    /// renumber the whole list 1..N.
    ///
    /// All rows are re-read from the store; those whose order changes are written back
    /// with only `match_order` replaced. A stored order that differs from this session's
    /// is a [`ScheduleError::Conflict`]. Reordering is not recorded for undo.
    pub fn reorder(
        &mut self,
        store: &dyn ScheduleStore,
        source: usize,
        destination: usize,
    ) -> Result<(), ScheduleError> {
        let visible: Vec<MatchId> = self.visible().iter().map(|m| m.match_id).collect();
        let len = visible.len();
        if source >= len {
            return Err(ScheduleError::IndexOutOfRange { index: source, len });
        }
        if destination >= len {
            return Err(ScheduleError::IndexOutOfRange {
                index: destination,
                len,
            });
        }
        if source == destination {
            return Ok(());
        }

        let moved = visible[source];
        let target = visible[destination];
        let mut order: Vec<MatchId> = self.matches.iter().map(|m| m.match_id).collect();
        let from = position_of(&order, moved)?;
        let to = position_of(&order, target)?;
        order.remove(from);
        order.insert(to, moved);

        // The whole list is re-read: if the stored order no longer matches what this
        // session shows, someone else reordered or regenerated in between.
        let fresh = store.matches_by_id(&order).map_err(|e| {
            log::error!("Fetching matches for reorder failed: {e}");
            e
        })?;
        let mut reordered = Vec::with_capacity(order.len());
        let mut staged = Vec::new();
        for (i, id) in order.iter().enumerate() {
            let cached = self.find(*id).map(|m| m.match_order);
            let mut row = match fresh.iter().find(|m| m.match_id == *id) {
                Some(row) if Some(row.match_order) == cached => row.clone(),
                _ => {
                    log::warn!("Match {id} was reordered or removed by another session");
                    return Err(ScheduleError::Conflict { match_id: *id });
                }
            };
            let new_order = i as u32 + 1;
            if row.match_order != new_order {
                row.match_order = new_order;
                staged.push(row.clone());
            }
            reordered.push(row);
        }

        let stored = store.upsert_matches(&staged).map_err(|e| {
            log::error!("Saving match order failed: {e}");
            ScheduleError::from(e)
        })?;

        for row in &mut reordered {
            if let Some(m) = stored.iter().find(|m| m.match_id == row.match_id) {
                *row = m.clone();
            }
        }
        self.matches = reordered;
        log::info!(
            "Moved match {moved} to position {}; {} matches renumbered",
            to + 1,
            stored.len()
        );
        Ok(())
    }

    /// Revert the most recent batch mutation: the column it touched goes back to the
    /// value in its snapshot, for exactly the matches it recorded. Then re-fetch.
    ///
    /// Matches deleted since the mutation are skipped. On failure the record is kept.
    pub fn undo(&mut self, store: &dyn ScheduleStore) -> Result<usize, ScheduleError> {
        let update = self.history.last().ok_or(ScheduleError::NothingToUndo)?;
        let mut staged = Vec::with_capacity(update.matches.len());
        for before in &update.matches {
            match self.find(before.match_id) {
                Some(current) => {
                    let mut row = current.clone();
                    update.restore_into(&mut row, before);
                    staged.push(row);
                }
                None => log::warn!(
                    "Match {} no longer exists, skipping it in undo",
                    before.match_id
                ),
            }
        }

        let stored = store.upsert_matches(&staged).map_err(|e| {
            log::error!("Undoing batch update failed: {e}");
            ScheduleError::from(e)
        })?;
        self.replace_rows(&stored);
        self.history.pop();

        if let Err(e) = self.refresh(store) {
            log::warn!("Undo saved, but reloading the schedule failed: {e}");
        }
        Ok(stored.len())
    }

    /// Selected matches as currently held, for staging a batch edit.
    fn selected_snapshot(&self) -> Result<Vec<Match>, ScheduleError> {
        if self.selection.is_empty() {
            return Err(ScheduleError::EmptySelection);
        }
        self.selection
            .iter()
            .map(|id| {
                self.find(*id)
                    .cloned()
                    .ok_or(ScheduleError::MatchNotFound(*id))
            })
            .collect()
    }

    /// Write staged rows; on success adopt the stored rows and record the mutation.
    fn apply_batch(
        &mut self,
        store: &dyn ScheduleStore,
        kind: BatchKind,
        staged: Vec<Match>,
        snapshot: Vec<Match>,
    ) -> Result<usize, ScheduleError> {
        let stored = store.upsert_matches(&staged).map_err(|e| {
            log::error!("Batch {kind:?} update of {} matches failed: {e}", staged.len());
            ScheduleError::from(e)
        })?;
        self.replace_rows(&stored);
        log::info!("Batch {kind:?} applied to {} matches", stored.len());
        self.history.push(BatchUpdate {
            kind,
            matches: snapshot,
        });
        Ok(stored.len())
    }

    fn replace_rows(&mut self, rows: &[Match]) {
        for row in rows {
            if let Some(local) = self.matches.iter_mut().find(|m| m.match_id == row.match_id) {
                *local = row.clone();
            }
        }
    }
}

fn position_of(order: &[MatchId], id: MatchId) -> Result<usize, ScheduleError> {
    order
        .iter()
        .position(|m| *m == id)
        .ok_or(ScheduleError::MatchNotFound(id))
}
