//! Pool stage: round-robin match generation and schedule replacement.

use crate::config::ScheduleConfig;
use crate::models::{FieldNumber, Match, NewMatch, Pool, ScheduleError, TeamId, TournamentId};
use crate::store::ScheduleStore;

/// Every unordered pair of teams, once. The first-listed team of a pair is home.
///
/// A team listed twice counts once, so nobody is paired with themselves.
/// Fewer than two teams give no pairs.
pub fn round_robin_pairs(teams: &[TeamId]) -> Vec<(TeamId, TeamId)> {
    let mut unique: Vec<TeamId> = Vec::with_capacity(teams.len());
    for &team in teams {
        if !unique.contains(&team) {
            unique.push(team);
        }
    }

    let n = unique.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for (i, &home) in unique.iter().enumerate() {
        for &away in &unique[i + 1..] {
            pairs.push((home, away));
        }
    }
    pairs
}

/// Build the non-playoff schedule for a tournament (no store access).
///
/// 1. Pools are taken in the given order; each contributes its round-robin pairs.
/// 2. One counter runs over the concatenated list: it cycles through `fields`
///    (1, 2, 1, 2, ... for two fields) regardless of pool boundaries.
/// 3. `match_order` is the 1-based position in that list.
pub fn build_schedule(
    tournament_id: TournamentId,
    pools: &[Pool],
    fields: &[FieldNumber],
) -> Result<Vec<NewMatch>, ScheduleError> {
    if fields.is_empty() {
        return Err(ScheduleError::NoFieldsConfigured);
    }

    let mut schedule = Vec::new();
    for pool in pools {
        for (home, away) in round_robin_pairs(&pool.team_ids()) {
            let field = fields[schedule.len() % fields.len()];
            let order = schedule.len() as u32 + 1;
            schedule.push(NewMatch::pool_match(
                tournament_id,
                pool.pool_id,
                home,
                away,
                field,
                order,
            ));
        }
    }
    Ok(schedule)
}

/// Replace every non-playoff match of the tournament with a freshly generated schedule.
///
/// The new matches are inserted before the old ones are deleted. If the insert fails the
/// old schedule is left as it was. If the delete fails, the new rows are removed again;
/// only when that also fails is the store left holding both sets
/// ([`ScheduleError::PartialGeneration`]).
///
/// Existing date/time/field edits are discarded: regeneration starts from scratch.
pub fn generate_schedule(
    store: &dyn ScheduleStore,
    tournament_id: TournamentId,
    config: &ScheduleConfig,
) -> Result<Vec<Match>, ScheduleError> {
    let pools = store.pools(tournament_id)?;
    let schedule = build_schedule(tournament_id, &pools, &config.fields)?;
    let old_ids: Vec<_> = store
        .matches(tournament_id)?
        .iter()
        .map(|m| m.match_id)
        .collect();

    let inserted = store.insert_matches(&schedule).map_err(|e| {
        log::error!("Inserting schedule for tournament {tournament_id} failed: {e}");
        e
    })?;

    if let Err(delete_err) = store.delete_matches(&old_ids) {
        log::error!(
            "Removing {} old matches of tournament {tournament_id} failed: {delete_err}",
            old_ids.len()
        );
        let new_ids: Vec<_> = inserted.iter().map(|m| m.match_id).collect();
        return match store.delete_matches(&new_ids) {
            Ok(()) => Err(delete_err.into()),
            Err(rollback_err) => {
                log::error!(
                    "Rolling back new schedule of tournament {tournament_id} failed: {rollback_err}"
                );
                Err(ScheduleError::PartialGeneration {
                    old: old_ids.len(),
                    new: new_ids.len(),
                    reason: rollback_err.to_string(),
                })
            }
        };
    }

    log::info!(
        "Generated {} matches over {} pools for tournament {tournament_id}",
        inserted.len(),
        pools.len()
    );
    Ok(inserted)
}
